//! Domain models and their schemas.

mod image;
mod item;
mod logistics;
mod model_name;
mod offer;
mod unicorn;
mod user;

pub use image::{Image, IMAGE_SCHEMA};
pub use item::{item_examples, Item, ITEM_SCHEMA};
pub use logistics::{
    vehicle_union, BaseItem, CarItem, PlaneItem, BASE_ITEM_SCHEMA, CAR_ITEM_SCHEMA, DISCRIMINANT,
    PLANE_ITEM_SCHEMA,
};
pub use model_name::ModelName;
pub use offer::{Offer, OFFER_SCHEMA};
pub use unicorn::{unicorn_exception, Unicorn, UNICORN_EXCEPTION, UNICORN_SCHEMA};
pub use user::{
    fake_password_hasher, fake_save_user, User, UserIn, UserInDB, UserOut, USER_IN_DB_SCHEMA,
    USER_IN_SCHEMA, USER_OUT_SCHEMA, USER_SCHEMA,
};
