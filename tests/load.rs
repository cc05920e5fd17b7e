// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 fpga-intent contributors

// End-to-end loading through the public library API (parse → build).

use fpga_intent::intent::ConnectionGraph;
use fpga_intent::{build, load, parse, ErrorKind, ErrorSet, Location, PipelineIr};

fn load_ok(text: &str) -> PipelineIr {
    load(text).unwrap_or_else(|errors| panic!("unexpected errors:\n{}", errors))
}

fn load_err(text: &str) -> ErrorSet {
    match load(text) {
        Ok(ir) => panic!("expected errors, got IR with order {:?}", ir.order()),
        Err(errors) => errors,
    }
}

fn position(ir: &PipelineIr, id: &str) -> usize {
    ir.order().iter().position(|s| s == id).unwrap()
}

/// Two stages `a` and `b`, each with one int<8> input `in` and output `out`
fn loop_pair(b_feedback: bool) -> String {
    format!(
        r#"
name: loop
stages:
  - id: a
    kind: transform
    ports:
      in: {{ direction: input, dtype: int, width: 8 }}
      out: {{ direction: output, dtype: int, width: 8 }}
  - id: b
    kind: register
    feedback_capable: {b_feedback}
    ports:
      in: {{ direction: input, dtype: int, width: 8 }}
      out: {{ direction: output, dtype: int, width: 8 }}
connections:
  - {{ from: a.out, to: b.in }}
  - {{ from: b.out, to: a.in }}
"#
    )
}

const DSP_CHAIN: &str = r#"
version: 2
name: dsp_chain
description: decimating filter bank
stages:
  - id: sink
    kind: sink
    ports:
      in: { direction: input, dtype: fixed, width: 16 }
  - id: mix
    kind: merge
    ports:
      lo: { direction: input, dtype: fixed, width: 16 }
      hi: { direction: input, dtype: fixed, width: 16 }
      out: { direction: output, dtype: fixed, width: 16 }
  - id: lowpass
    kind: transform
    parameters: { taps: 64, window: hann }
    ports:
      in: { direction: input, dtype: fixed, width: 16 }
      out: { direction: output, dtype: fixed, width: 16 }
  - id: highpass
    kind: transform
    ports:
      in: { direction: input, dtype: fixed, width: 16 }
      out: { direction: output, dtype: fixed, width: 16 }
  - id: adc
    kind: source
    ports:
      out: { direction: output, dtype: fixed, width: 16 }
connections:
  - { from: mix.out, to: sink.in }
  - { from: lowpass.out, to: mix.lo }
  - { from: highpass.out, to: mix.hi }
  - { from: adc.out, to: lowpass.in }
  - { from: adc.out, to: highpass.in }
"#;

#[test]
fn order_is_a_linearization_of_the_graph() {
    let ir = load_ok(DSP_CHAIN);

    assert_eq!(ir.version(), "2");
    assert_eq!(ir.description(), Some("decimating filter bank"));
    assert_eq!(ir.order().len(), ir.stages().len());
    for connection in ir.connections() {
        assert!(
            position(&ir, &connection.from.stage) < position(&ir, &connection.to.stage),
            "{} runs backwards in {:?}",
            connection,
            ir.order()
        );
    }
    // Ties between ready stages follow declaration order
    assert_eq!(ir.order(), ["adc", "lowpass", "highpass", "mix", "sink"]);
}

#[test]
fn parse_and_build_are_separate_phases() {
    let tree = parse(DSP_CHAIN).unwrap();
    let ir = build(&tree).unwrap();
    assert_eq!(ir, load_ok(DSP_CHAIN));
}

#[test]
fn loading_twice_gives_equal_ir() {
    let first = load_ok(DSP_CHAIN);
    let second = load_ok(DSP_CHAIN);

    assert_eq!(first, second);
    assert_eq!(first.fingerprint().unwrap(), second.fingerprint().unwrap());
    assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
}

#[test]
fn duplicate_id_is_reported_once() {
    let errors = load_err(
        r#"
name: dup
stages:
  - { id: a, kind: source }
  - { id: a, kind: sink }
"#,
    );

    assert_eq!(errors.len(), 1);
    let error = errors.iter().next().unwrap();
    assert_eq!(error.kind, ErrorKind::DuplicateStageId);
    assert_eq!(error.location, Some(Location::path("stages[1].id")));
}

#[test]
fn feed_forward_cycle_is_rejected() {
    let errors = load_err(&loop_pair(false));

    assert_eq!(errors.len(), 1);
    let cycle = errors.of_kind(ErrorKind::CycleDetected).next().unwrap();
    assert!(cycle.message.contains("a, b"), "{}", cycle.message);
}

#[test]
fn feedback_stage_closes_the_loop_and_runs_last() {
    let ir = load_ok(&loop_pair(true));
    assert_eq!(ir.order(), ["a", "b"]);
}

#[test]
fn input_port_accepts_a_single_driver() {
    let header = r#"
name: fan
stages:
  - id: x
    kind: source
    ports: { out: { direction: output, dtype: bool, width: 1 } }
  - id: y
    kind: source
    ports: { out: { direction: output, dtype: bool, width: 1 } }
  - id: b
    kind: sink
    ports: { in: { direction: input, dtype: bool, width: 1 } }
connections:
  - { from: x.out, to: b.in }
"#;
    load_ok(header);

    let errors = load_err(&format!("{header}  - {{ from: y.out, to: b.in }}\n"));
    assert_eq!(errors.len(), 1);
    let fan_in = errors.of_kind(ErrorKind::PortFanInViolation).next().unwrap();
    assert!(fan_in.message.contains("x.out -> b.in"), "{}", fan_in.message);
    assert!(fan_in.message.contains("y.out -> b.in"), "{}", fan_in.message);
}

#[test]
fn narrowing_needs_a_width_reducing_stage() {
    let pipeline = |reducing: bool| {
        format!(
            r#"
name: narrow
stages:
  - id: wide
    kind: source
    ports: {{ out: {{ direction: output, dtype: int, width: 16 }} }}
  - id: narrow
    kind: sink
    width_reducing: {reducing}
    ports: {{ in: {{ direction: input, dtype: int, width: 8 }} }}
connections:
  - {{ from: wide.out, to: narrow.in }}
"#
        )
    };

    let errors = load_err(&pipeline(false));
    assert_eq!(errors.count(ErrorKind::PortTypeMismatch), 1);
    assert_eq!(errors.len(), 1);

    let ir = load_ok(&pipeline(true));
    assert_eq!(ir.order(), ["wide", "narrow"]);
}

#[test]
fn semantic_errors_accumulate_in_one_load() {
    let errors = load_err(
        r#"
name: many
stages:
  - id: a
    kind: source
    ports: { out: { direction: output, dtype: uint, width: 4 } }
  - id: a
    kind: sink
connections:
  - { from: a.out, to: ghost.in }
"#,
    );

    assert!(errors.contains(ErrorKind::DuplicateStageId));
    assert!(errors.contains(ErrorKind::UnknownStageOrPort));
    assert_eq!(errors.len(), 2);
}

#[test]
fn syntax_errors_carry_a_source_position() {
    let errors = load_err("name: [unclosed\nstages: []\n");

    assert_eq!(errors.len(), 1);
    let error = errors.iter().next().unwrap();
    assert_eq!(error.kind, ErrorKind::SyntaxError);
    assert!(matches!(error.location, Some(Location::Source { .. })));
}

#[test]
fn text_graph_lists_stages_in_order() {
    let ir = load_ok(&loop_pair(true));
    let graph = ConnectionGraph::from_ir(&ir);

    insta::assert_snapshot!(graph.to_text(&ir).trim_end(), @r"
    1. a (transform) [from: b]
    2. b (register) [from: a] [feedback]
    ");
}

#[test]
fn ir_is_shared_across_threads() {
    let ir = std::sync::Arc::new(load_ok(DSP_CHAIN));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let ir = std::sync::Arc::clone(&ir);
            std::thread::spawn(move || ir.order().to_vec())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), ir.order());
    }
}
