pub mod app;
pub mod catalog;
pub mod factory;

#[allow(unused_imports)]
pub use app::TestApp;
#[allow(unused_imports)]
pub use catalog::{FakeCatalog, BROKEN_NAME};
#[allow(unused_imports)]
pub use factory::{Factory, TestAuth, TEST_PASSWORD};
