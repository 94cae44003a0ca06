mod business;
mod event;
mod location;
mod lookup;
mod movie;
mod resource;
mod trail;
mod weather;

pub use business::*;
pub use event::*;
pub use location::*;
pub use lookup::*;
pub use movie::*;
pub use resource::*;
pub use trail::*;
pub use weather::*;
