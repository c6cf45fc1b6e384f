//! Probe command implementation

use anyhow::Result;
use nativemem::platform;
use serde::Serialize;

use crate::utils::format_size;

#[derive(Serialize)]
struct ProbeSummary {
    family: String,
    has_64bit: bool,
    pointer_width: u32,
    library_handle: Option<String>,
    native_order: String,
    page_size: usize,
    large_page_size: usize,
}

pub fn run(json: bool) -> Result<()> {
    let platform = platform();
    let summary = ProbeSummary {
        family: format!("{:?}", platform.family()),
        has_64bit: platform.has_64bit(),
        pointer_width: platform.pointer_width(),
        library_handle: platform
            .library_handle()
            .map(|h| format!("{:#x}", h.get())),
        native_order: platform.native_order().to_string(),
        page_size: platform.page_size(),
        large_page_size: platform.large_page_size(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Platform:        {}", summary.family);
    println!("64-bit:          {}", summary.has_64bit);
    println!("Pointer width:   {} bits", summary.pointer_width);
    println!(
        "Library handle:  {}",
        summary.library_handle.as_deref().unwrap_or("<unavailable>")
    );
    println!("Native order:    {}", summary.native_order);
    println!("Page size:       {}", format_size(summary.page_size));
    println!("Large page size: {}", format_size(summary.large_page_size));
    Ok(())
}
