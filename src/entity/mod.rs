pub mod addresses;
pub mod audit_logs;
pub mod cart_items;
pub mod categories;
pub mod enums;
pub mod influencer_profiles;
pub mod influencer_videos;
pub mod order_items;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod users;
pub mod video_products;
pub mod wishlist_items;

pub use addresses::Entity as Addresses;
pub use audit_logs::Entity as AuditLogs;
pub use cart_items::Entity as CartItems;
pub use categories::Entity as Categories;
pub use influencer_profiles::Entity as InfluencerProfiles;
pub use influencer_videos::Entity as InfluencerVideos;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use products::Entity as Products;
pub use reviews::Entity as Reviews;
pub use users::Entity as Users;
pub use video_products::Entity as VideoProducts;
pub use wishlist_items::Entity as WishlistItems;
