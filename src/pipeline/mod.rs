pub mod assembly;
pub mod correction;
pub mod decision;
pub mod extraction;
pub mod structuring;
