pub mod annotation;
pub mod application;
pub mod builder;
pub mod endpoint;
pub mod eventing;
pub mod expression;
pub mod parameter;
pub mod resource;

pub use annotation::*;
pub use application::*;
pub use builder::*;
pub use endpoint::*;
pub use eventing::*;
pub use expression::*;
pub use parameter::*;
pub use resource::*;
