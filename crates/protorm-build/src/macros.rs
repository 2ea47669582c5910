//! Build-script helper that runs protorm codegen for a JSON compilation unit.
//!
//! Every input file becomes `<stem>.orm.rs` in `OUT_DIR`, ready to be
//! `include!`d next to the prost types of its package. Must be called from a
//! `main` returning `Result<(), Box<dyn std::error::Error>>`.
#[macro_export]
macro_rules! build {
    ($descriptor:expr) => {
        $crate::build!($descriptor, ::protorm::schema::config::Config::default())
    };

    ($descriptor:expr, $config:expr) => {
        use std::{env::var, fs, path::PathBuf};

        //
        // CARGO
        //

        println!("cargo:rerun-if-changed=build.rs");
        println!("cargo:rerun-if-changed={}", $descriptor);

        // Get the output directory set by Cargo
        let out_dir = PathBuf::from(var("OUT_DIR")?);

        //
        // ORM CODE
        //

        let json = fs::read_to_string($descriptor)?;
        let unit = ::protorm::schema::descriptor::CompilationUnit::from_json(&json)?;
        let files = ::protorm::build::generate(&unit, &$config)?;

        // write the files
        for file in files {
            fs::write(out_dir.join(&file.name), file.content.as_bytes())?;
        }
    };
}
