mod application;

mod presentation {
    pub mod cli;
}

use hamming_core::Result;

#[tokio::main]
async fn main() -> Result<()> {
    application::run().await
}
