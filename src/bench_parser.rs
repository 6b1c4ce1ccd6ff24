use hansard_ingest::transcript::parse_bytes;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::time::Instant;

fn count_xml_nodes(xml: &str) -> usize {
    let mut reader = Reader::from_str(xml);
    let mut count = 0;
    loop {
        match reader.read_event() {
            Ok(Event::Eof) => break,
            Ok(_) => count += 1,
            Err(e) => panic!("XML error at position {}: {:?}", reader.error_position(), e),
        }
    }
    count
}

fn mean_and_min(durations: &[f64]) -> (f64, f64) {
    let avg = durations.iter().sum::<f64>() / durations.len() as f64;
    let min = durations.iter().copied().fold(f64::INFINITY, f64::min);
    (avg, min)
}

fn main() {
    tracing_subscriber::fmt::init();

    let path = std::env::args().nth(1).expect("Usage: bench_parser <hansard_xml_file>");
    let bytes = std::fs::read(&path).expect("Failed to read XML file");
    let xml = String::from_utf8_lossy(&bytes).into_owned();

    let iterations = 5;

    // Baseline: just iterate XML events
    let _ = count_xml_nodes(&xml);
    let mut baseline = Vec::new();
    for i in 0..iterations {
        let start = Instant::now();
        let node_count = count_xml_nodes(&xml);
        let elapsed = start.elapsed().as_secs_f64();
        baseline.push(elapsed);
        println!("Baseline {}: {:.3}s ({} XML events)", i + 1, elapsed, node_count);
    }
    let (baseline_avg, baseline_min) = mean_and_min(&baseline);
    println!("Baseline avg: {:.3}s, min: {:.3}s\n", baseline_avg, baseline_min);

    let mut parsed = Vec::new();
    for i in 0..iterations {
        let start = Instant::now();
        let document = match parse_bytes(&bytes) {
            Ok(document) => document,
            Err(e) => {
                tracing::error!("[Alpheus] Could not parse {}: {}", path, e);
                std::process::exit(1);
            }
        };
        let elapsed = start.elapsed().as_secs_f64();
        parsed.push(elapsed);
        println!(
            "Iteration {}: {:.3}s ({} statements, {} #{})",
            i + 1,
            elapsed,
            document.statements.len(),
            document.meta.document_type.as_str(),
            document.meta.document_number,
        );
    }

    let (avg, min) = mean_and_min(&parsed);
    println!("\nParser avg: {:.3}s, min: {:.3}s", avg, min);
    println!("Overhead vs baseline: {:.1}x", avg / baseline_avg);
}
