pub mod list;

mod certificates;
mod logs;
mod namespaces;
mod pdb;
mod pods;
mod storage;

pub use certificates::CertificatesView;
pub use logs::LogsView;
pub use namespaces::NamespacesView;
pub use pdb::PdbView;
pub use pods::PodsView;
pub use storage::StorageView;
