/// Use cases module containing application orchestration
mod scan_project;

pub use scan_project::ScanProjectUseCase;
