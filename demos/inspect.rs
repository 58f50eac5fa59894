//! Demo: decode a model, lay it out and print a summary.
//!
//! ```bash
//! cargo run --example inspect -- model.onnx [layout.toml] [--json]
//! ```
//!
//! Without a model path a small synthetic residual network is used.

use onnx_graphviz::prelude::*;
use onnx_graphviz::proto::extensions::{make_node, make_tensor_value_info};
use onnx_graphviz::proto::{AttributeProto, GraphProto, ModelProto};
use prost::Message;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let json = args.iter().any(|a| a == "--json");
    let positional: Vec<&String> = args.iter().filter(|a| !a.starts_with("--")).collect();

    let output = match (positional.first(), positional.get(1)) {
        (Some(path), Some(config_path)) => run_file_with_config(path.as_str(), config_path.as_str()),
        (Some(path), None) => run_file(path.as_str(), &LayoutConfig::default()),
        (None, _) => run(
            &synthetic_model(4).encode_to_vec(),
            &OnnxSchema,
            &LayoutConfig::default(),
        ),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    match &output {
        PipelineOutput::Loaded(loaded) => {
            let analysis = &loaded.analysis;
            println!("Producer:     {}", loaded.model.producer);
            println!("Graph:        {}", loaded.model.graph_name);
            println!(
                "Counts:       {} inputs, {} outputs, {} operators, {} initializers",
                analysis.total_inputs,
                analysis.total_outputs,
                analysis.total_nodes,
                analysis.total_initializers,
            );
            println!("Complexity:   {:?}", analysis.model_complexity);
            println!(
                "Layout:       {} nodes, {} edges, {:.0} x {:.0}",
                loaded.graph.nodes.len(),
                loaded.graph.edges.len(),
                loaded.graph.width,
                loaded.graph.height,
            );

            println!("\n{:<24} {:>8}", "Operator", "Count");
            println!("{}", "-".repeat(33));
            for (op, count) in analysis.top_operators(10) {
                println!("{:<24} {:>8}", op, count);
            }

            if !loaded.warnings.is_empty() {
                println!("\nWarnings:");
                for warning in &loaded.warnings {
                    println!("  - {}", warning);
                }
            }
        }
        PipelineOutput::Fallback { error, stage } => {
            println!("Failed during {:?}: {}", stage, error);
        }
    }

    Ok(())
}

/// `blocks` residual blocks of Conv → Relu → Conv → Add → Relu
fn synthetic_model(blocks: usize) -> ModelProto {
    let mut nodes = Vec::new();
    let mut current = "input".to_string();

    for i in 0..blocks {
        let conv_a = format!("block{}_conv_a", i);
        let relu_a = format!("block{}_relu_a", i);
        let conv_b = format!("block{}_conv_b", i);
        let sum = format!("block{}_add", i);
        let out = format!("block{}_out", i);
        let (w_a, b_a) = (format!("w{}a", i), format!("b{}a", i));
        let (w_b, b_b) = (format!("w{}b", i), format!("b{}b", i));

        let mut first = make_node("Conv", &[&*current, &*w_a, &*b_a], &[&*conv_a], &conv_a);
        first.attribute = vec![
            AttributeProto::new_ints("kernel_shape", vec![3, 3]),
            AttributeProto::new_ints("strides", vec![1, 1]),
            AttributeProto::new_ints("pads", vec![1, 1, 1, 1]),
        ];
        nodes.push(first);
        nodes.push(make_node("Relu", &[&*conv_a], &[&*relu_a], &relu_a));
        nodes.push(make_node("Conv", &[&*relu_a, &*w_b, &*b_b], &[&*conv_b], &conv_b));
        nodes.push(make_node("Add", &[&*conv_b, &*current], &[&*sum], &sum));
        nodes.push(make_node("Relu", &[&*sum], &[&*out], &out));
        current = out;
    }

    ModelProto {
        ir_version: 8,
        producer_name: "inspect-demo".to_string(),
        producer_version: "1.0".to_string(),
        graph: Some(GraphProto {
            name: "residual".to_string(),
            node: nodes,
            input: vec![make_tensor_value_info("input", 1, &[1, 64, 56, 56])],
            output: vec![make_tensor_value_info(&current, 1, &[1, 64, 56, 56])],
            ..Default::default()
        }),
        ..Default::default()
    }
}
