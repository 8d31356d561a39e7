pub mod completion;
pub mod fixture;
pub mod linking_engine;
pub mod native;
pub mod scanning_engine;
pub mod scripted;
