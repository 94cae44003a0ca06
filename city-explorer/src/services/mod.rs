mod resolver;
mod resolvers;
mod single_flight;
mod sweeper;

pub use resolver::LookasideResolver;
pub use resolvers::Resolvers;
pub use single_flight::SingleFlight;
pub use sweeper::StaleRowSweeper;
