use streamcorr_core::topology::{NodeKind, build_topology};

pub fn run(variables: usize, json: bool) {
    let topology = match build_topology(variables) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Cannot build topology: {e}");
            std::process::exit(1);
        }
    };

    if json {
        match serde_json::to_string_pretty(&topology) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                eprintln!("Cannot serialize topology: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    let sources = topology.nodes_of(NodeKind::Source).count();
    let correlators = topology.nodes_of(NodeKind::Correlator).count();
    println!(
        "{} nodes, {} edges: 1 trigger, {} sources, {} pair correlators, 1 aggregator\n",
        topology.nodes.len(),
        topology.edges.len(),
        sources,
        correlators,
    );

    for node in &topology.nodes {
        println!(
            "  {:<12} in: [{}]  out: [{}]",
            node.name,
            node.inputs.join(", "),
            node.outputs.join(", ")
        );
    }
    println!();
    for edge in &topology.edges {
        println!(
            "  {}.{} -> {}.{}",
            edge.from_node, edge.from_port, edge.to_node, edge.to_port
        );
    }
}
