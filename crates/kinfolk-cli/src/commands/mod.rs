//! Command implementations.

pub mod codes;
pub mod edges;
pub mod init;
pub mod person;
pub mod relate;
pub mod suggest;

pub use self::codes::execute_codes;
pub use self::edges::execute_edges;
pub use self::init::execute_init;
pub use self::person::execute_person;
pub use self::relate::{
    execute_accept, execute_reject, execute_relate, execute_request, execute_unrelate,
};
pub use self::suggest::execute_suggest;
