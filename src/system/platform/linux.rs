use crate::system::fs::RealFs;
use crate::system::procfs::ProcfsCollector;
use crate::system::users::SystemAccounts;

pub const NAME: &str = "linux";

pub type Collector = ProcfsCollector<RealFs, SystemAccounts>;

pub fn collector() -> Collector {
    ProcfsCollector::new(RealFs, "/proc", SystemAccounts::load())
}
