pub mod address;
pub mod bank_account;
pub mod compensation;
pub mod document;
pub mod employment;
pub mod permission;
pub mod role;
pub mod user;

pub use address::Address;
pub use bank_account::BankAccount;
pub use compensation::Compensation;
pub use document::Document;
pub use employment::EmploymentDetail;
pub use permission::Permission;
pub use role::Role;
pub use user::User;
