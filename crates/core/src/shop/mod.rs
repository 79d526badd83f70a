mod error;
mod operations;
mod types;

pub use error::ValidationError;
pub use operations::{
    validate_machine, validate_order, validate_product, validate_shift, validate_task,
    validate_user, Validate,
};
pub use types::{
    Machine, MachineKind, Order, OrderLine, OrderStatus, Product, ProductCategory, Shift, Task,
    TaskKind, TaskStatus, User,
};
