use protorm::schema::config::Config;
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    protorm::build!("descriptors/shop.json", Config::default().with_gateway(true));

    Ok(())
}
