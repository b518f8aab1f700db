//! Table repositories: unit structs with static async methods over a
//! [`PgPool`](sqlx::PgPool), one per table.

pub mod activity_repo;
pub mod comment_repo;
pub mod department_repo;
pub mod notification_repo;
pub mod ticket_repo;
pub mod user_repo;

pub use activity_repo::ActivityLogRepo;
pub use comment_repo::CommentRepo;
pub use department_repo::DepartmentRepo;
pub use notification_repo::NotificationRepo;
pub use ticket_repo::TicketRepo;
pub use user_repo::UserRepo;
