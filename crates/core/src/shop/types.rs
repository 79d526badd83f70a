use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{Identity, Role};
use crate::storage::{DocumentId, Entity};

macro_rules! impl_entity {
    ($ty:ty, $kind:literal $(, versioned = $versioned:literal)? $(, unique = $unique:ident)?) => {
        impl Entity for $ty {
            const KIND: &'static str = $kind;
            $(const VERSIONED: bool = $versioned;)?

            fn id(&self) -> Option<&DocumentId> {
                self.id.as_ref()
            }

            fn set_id(&mut self, id: DocumentId) {
                self.id = Some(id);
            }

            fn uuid(&self) -> Uuid {
                self.uuid
            }

            $(fn unique_key(&self) -> Option<String> {
                Some(self.$unique.to_ascii_lowercase())
            })?
        }
    };
}

/// A shop account: client, workshop worker or administrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DocumentId>,
    pub uuid: Uuid,
    pub name: String,
    pub surname: String,
    pub email: String,
    /// Argon2 PHC string. Never leaves the server.
    #[serde(default, skip_serializing)]
    pub password_hash: String,
    pub profile: Role,
    pub active: bool,
}

impl User {
    /// Creates a new active user with a generated uuid.
    pub fn new(
        name: impl Into<String>,
        surname: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
        profile: Role,
    ) -> Self {
        Self {
            id: None,
            uuid: Uuid::new_v4(),
            name: name.into(),
            surname: surname.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            profile,
            active: true,
        }
    }

    /// Projects the fields carried by a session token.
    pub fn identity(&self) -> Identity {
        Identity {
            id: self.uuid,
            name: self.name.clone(),
            surname: self.surname.clone(),
            email: self.email.clone(),
            profile: self.profile,
            active: self.active,
        }
    }

    /// Returns a copy marked inactive.
    pub fn deactivated(&self) -> Self {
        Self {
            active: false,
            ..self.clone()
        }
    }
}

impl_entity!(User, "User", versioned = true, unique = email);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductCategory {
    Racket,
    String,
    Grip,
    Bag,
    Accessory,
}

/// An item sold over the counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DocumentId>,
    pub uuid: Uuid,
    pub name: String,
    pub brand: String,
    pub category: ProductCategory,
    pub price_cents: i64,
    pub stock: i64,
}

impl Product {
    pub fn new(
        name: impl Into<String>,
        brand: impl Into<String>,
        category: ProductCategory,
        price_cents: i64,
        stock: i64,
    ) -> Self {
        Self {
            id: None,
            uuid: Uuid::new_v4(),
            name: name.into(),
            brand: brand.into(),
            category,
            price_cents,
            stock,
        }
    }
}

impl_entity!(Product, "Product");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MachineKind {
    Stringing,
    Grommet,
    Grip,
}

/// A workshop machine tasks are scheduled on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Machine {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DocumentId>,
    pub uuid: Uuid,
    pub name: String,
    pub brand: String,
    pub kind: MachineKind,
    pub serial_number: String,
    pub active: bool,
}

impl Machine {
    pub fn new(
        name: impl Into<String>,
        brand: impl Into<String>,
        kind: MachineKind,
        serial_number: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            uuid: Uuid::new_v4(),
            name: name.into(),
            brand: brand.into(),
            kind,
            serial_number: serial_number.into(),
            active: true,
        }
    }
}

impl_entity!(Machine, "Machine");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    InProgress,
    Ready,
    Delivered,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_uuid: Uuid,
    pub quantity: u32,
    pub unit_price_cents: i64,
}

impl OrderLine {
    pub fn subtotal_cents(&self) -> i64 {
        self.unit_price_cents * i64::from(self.quantity)
    }
}

/// A client order, possibly spawning workshop tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DocumentId>,
    pub uuid: Uuid,
    pub client_uuid: Uuid,
    pub lines: Vec<OrderLine>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn new(client_uuid: Uuid, lines: Vec<OrderLine>) -> Self {
        Self {
            id: None,
            uuid: Uuid::new_v4(),
            client_uuid,
            lines,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        }
    }

    pub fn total_cents(&self) -> i64 {
        self.lines.iter().map(OrderLine::subtotal_cents).sum()
    }
}

impl_entity!(Order, "Order");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Stringing,
    Customization,
    Repair,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    Doing,
    Done,
}

/// A unit of workshop work attached to an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DocumentId>,
    pub uuid: Uuid,
    pub order_uuid: Uuid,
    pub machine_uuid: Option<Uuid>,
    pub worker_uuid: Option<Uuid>,
    pub kind: TaskKind,
    pub description: String,
    pub status: TaskStatus,
    pub price_cents: i64,
}

impl Task {
    pub fn new(
        order_uuid: Uuid,
        kind: TaskKind,
        description: impl Into<String>,
        price_cents: i64,
    ) -> Self {
        Self {
            id: None,
            uuid: Uuid::new_v4(),
            order_uuid,
            machine_uuid: None,
            worker_uuid: None,
            kind,
            description: description.into(),
            status: TaskStatus::Todo,
            price_cents,
        }
    }
}

impl_entity!(Task, "Task");

/// A worker's time slot, optionally bound to a machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shift {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DocumentId>,
    pub uuid: Uuid,
    pub worker_uuid: Uuid,
    pub machine_uuid: Option<Uuid>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

impl Shift {
    pub fn new(worker_uuid: Uuid, starts_at: DateTime<Utc>, ends_at: DateTime<Utc>) -> Self {
        Self {
            id: None,
            uuid: Uuid::new_v4(),
            worker_uuid,
            machine_uuid: None,
            starts_at,
            ends_at,
        }
    }

    pub fn duration(&self) -> Duration {
        self.ends_at - self.starts_at
    }
}

impl_entity!(Shift, "Shift");
