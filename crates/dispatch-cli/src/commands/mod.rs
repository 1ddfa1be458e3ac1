use dispatch_core::clock::SystemClock;
use dispatch_core::gateway::SqliteGateway;
use dispatch_core::series::SeriesService;

pub mod add;
pub mod cancel;
pub mod delete;
pub mod edit;
pub mod extend;
pub mod list;
pub mod preview;
pub mod show;

pub type Service = SeriesService<SqliteGateway, SystemClock>;
