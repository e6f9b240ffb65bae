// HugeTriangles
// copyright hugetriangles 2026

use huge_triangles::{app, log::init_log};
use log::{info, LevelFilter};

fn main() {
    init_log(LevelFilter::Info, "log/triangles.log");
    info!("huge_triangles start...");
    app::run();
}
