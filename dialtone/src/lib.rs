pub use dialtone_core::UserId;

pub mod model {
    pub use dialtone_core::model::*;
}

#[cfg(feature = "client")]
pub mod client {
    pub use dialtone_client::*;
}

#[cfg(feature = "relay")]
pub mod relay {
    pub use dialtone_relay::*;
}
