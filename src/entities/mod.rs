//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod game_name;
pub mod month_record;
pub mod product;
pub mod task;
pub mod user;

// Re-export specific types to avoid conflicts
pub use game_name::{Column as GameNameColumn, Entity as GameName, Model as GameNameModel};
pub use month_record::{
    Column as MonthRecordColumn, Entity as MonthRecord, Model as MonthRecordModel,
};
pub use product::{
    Column as ProductColumn, Entity as Product, Model as ProductModel, ProductCategory,
    ProductStatus,
};
pub use task::{Column as TaskColumn, Entity as Task, Model as TaskModel, TaskStatus};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel, Role};
