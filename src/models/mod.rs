pub mod analysis;
pub mod crop_profile;
pub mod overview;
pub mod parcela;
pub mod reading;

pub use analysis::*;
pub use crop_profile::*;
pub use overview::*;
pub use parcela::*;
pub use reading::*;
