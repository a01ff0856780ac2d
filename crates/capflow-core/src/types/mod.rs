//! Domain types for the Capflow workflow core.

mod cashflow;
mod date;
mod ids;
mod investment;
mod notification;
mod payment;
mod roles;

pub use cashflow::{Cashflow, CashflowStatus, CashflowType, Confirmation, MonthBucket, Postponement};
pub use date::Date;
pub use ids::{CashflowId, CompanyId, GroupId, InvestmentId, NotificationId, UserId};
pub use investment::{Investment, InvestmentMetadata, InvestmentStatus};
pub use notification::{Notification, NotificationKind, NotificationPriority, RelatedEntity};
pub use payment::{
    BalloonPayment, DownPayment, FinancingType, InstallmentPlan, LeaseSchedule, PaymentInterval,
    PaymentStructure, SinglePayment,
};
pub use roles::{Company, Group, Role, RoleAssignment, User};
