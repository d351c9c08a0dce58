use anyhow::Result;

fn main() -> Result<()> {
    let layout_path = std::env::args().nth(1);
    lotline_viewer::run(layout_path)
}
