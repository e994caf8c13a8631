pub mod admin_users;
pub mod order_items;
pub mod orders;
pub mod products;
pub mod sessions;

pub use admin_users::Entity as AdminUsers;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use products::Entity as Products;
pub use sessions::Entity as Sessions;
