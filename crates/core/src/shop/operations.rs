use super::error::ValidationError;
use super::types::{Machine, Order, Product, Shift, Task, User};

/// Documents that can check their own invariants before being persisted.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

fn require_text(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    Ok(())
}

fn require_non_negative(value: i64, field: &'static str) -> Result<(), ValidationError> {
    if value < 0 {
        return Err(ValidationError::NegativeAmount(field));
    }
    Ok(())
}

/// Validates a user before registration or update.
pub fn validate_user(user: &User) -> Result<(), ValidationError> {
    require_text(&user.name, "name")?;
    require_text(&user.surname, "surname")?;
    match user.email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(ValidationError::InvalidEmail(user.email.clone())),
    }
}

/// Validates a product before creation or update.
pub fn validate_product(product: &Product) -> Result<(), ValidationError> {
    require_text(&product.name, "name")?;
    require_text(&product.brand, "brand")?;
    require_non_negative(product.price_cents, "price_cents")?;
    require_non_negative(product.stock, "stock")
}

/// Validates a machine before creation or update.
pub fn validate_machine(machine: &Machine) -> Result<(), ValidationError> {
    require_text(&machine.name, "name")?;
    require_text(&machine.serial_number, "serial_number")
}

/// Validates an order before creation or update.
pub fn validate_order(order: &Order) -> Result<(), ValidationError> {
    if order.lines.is_empty() {
        return Err(ValidationError::EmptyOrder);
    }
    for line in &order.lines {
        if line.quantity == 0 {
            return Err(ValidationError::ZeroQuantity);
        }
        require_non_negative(line.unit_price_cents, "unit_price_cents")?;
    }
    Ok(())
}

/// Validates a task before creation or update.
pub fn validate_task(task: &Task) -> Result<(), ValidationError> {
    require_text(&task.description, "description")?;
    require_non_negative(task.price_cents, "price_cents")
}

/// Validates a shift before creation or update.
pub fn validate_shift(shift: &Shift) -> Result<(), ValidationError> {
    if shift.ends_at <= shift.starts_at {
        return Err(ValidationError::InvalidShiftRange);
    }
    Ok(())
}

impl Validate for User {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_user(self)
    }
}

impl Validate for Product {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_product(self)
    }
}

impl Validate for Machine {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_machine(self)
    }
}

impl Validate for Order {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_order(self)
    }
}

impl Validate for Task {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_task(self)
    }
}

impl Validate for Shift {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_shift(self)
    }
}
