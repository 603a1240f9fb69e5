fn main() {
    // Generate models for the integration tests. The output is only read by
    // tests, so the formatter is skipped to keep the build free of a Go toolchain.
    let out_dir = std::env::var("OUT_DIR").unwrap();

    gormgen::GeneratorBuilder::new("../demos/schema.sql")
        .output_dir(&out_dir)
        .package_name("models")
        .db_name("blog")
        .skip_format()
        .generate()
        .expect("codegen failed");

    gormgen::GeneratorBuilder::new("../demos/schema.sql")
        .output_dir(&out_dir)
        .package_name("custom/models")
        .db_name("blog")
        .templates("../demos/custom.tmpl")
        .skip_format()
        .generate()
        .expect("codegen with templates failed");

    println!("cargo:rerun-if-changed=../demos/schema.sql");
    println!("cargo:rerun-if-changed=../demos/custom.tmpl");
}
