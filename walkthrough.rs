//! Replays the classic driver scenario against a fresh bin: a pointer
//! array plus 64 fixed-size nodes, free half, reallocate, drain. The page
//! dump is printed between stages so the bucket and full-list transitions
//! are visible.

use anyhow::{Context, Result};
use pagebin::PageBin;

const LEN: usize = 64;
const NODE_BYTES: usize = 64;

fn main() -> Result<()> {
    let mut bin = PageBin::new();

    println!("pagebin {} - initial state, no pages:", pagebin::VERSION);
    bin.view();
    println!();

    let array = bin
        .allocate(LEN * core::mem::size_of::<*mut u8>())
        .context("array allocation")?;
    let mut nodes = Vec::with_capacity(LEN);
    for i in 0..LEN {
        let node = bin
            .allocate(NODE_BYTES)
            .with_context(|| format!("node {i}"))?;
        nodes.push(node);
    }

    println!("after allocating the array and {LEN} nodes of {NODE_BYTES} bytes:");
    bin.view();
    println!();

    for node in nodes.drain(..LEN / 2) {
        unsafe { bin.free(node.as_ptr()) };
    }

    println!("after freeing {} nodes; the freed blocks chain on the page:", LEN / 2);
    bin.view();
    println!();

    for i in 0..LEN / 2 {
        let node = bin
            .allocate(NODE_BYTES)
            .with_context(|| format!("reallocated node {i}"))?;
        nodes.push(node);
    }

    println!("after reallocating {}; recycled blocks were used first:", LEN / 2);
    bin.view();
    println!();

    for node in nodes.drain(..) {
        unsafe { bin.free(node.as_ptr()) };
    }
    unsafe { bin.free(array.as_ptr()) };

    println!("after freeing everything; pages are retained for reuse:");
    bin.view();
    println!();

    println!("counters: {:?}", bin.stats());

    Ok(())
}
