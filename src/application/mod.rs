pub mod cancel;
pub mod classifier;
pub mod dispatcher;
pub mod pipeline;
pub mod selector;
pub mod speech;
