use std::{env, fs, path::PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=queries");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let out_queries = out_dir.join("queries");
    println!("cargo:rustc-env=OUT_QUERIES={}", out_queries.display());
    fs::create_dir_all(&out_queries).unwrap();

    for entry in fs::read_dir("queries").unwrap() {
        let entry = entry.unwrap();
        let path = entry.path();
        let file_name = path.file_name().unwrap();
        fs::copy(&path, out_queries.join(file_name)).unwrap();
    }
}
