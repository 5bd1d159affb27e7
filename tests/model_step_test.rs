//! Integration tests for the incremental encoder–decoder step.

use candle_core::{DType, Device};
use nano_waitk::model::{AttentionDecoder, Encoder};
use nano_waitk::{Error, ModelConfig, WaitKModel};

fn test_device() -> Device {
    Device::Cpu
}

fn small_model() -> WaitKModel {
    let config = ModelConfig::new(20).embedding_dim(8).hidden_size(16);
    WaitKModel::new_random(&config, DType::F32, &test_device()).unwrap()
}

#[test]
fn test_encoder_states_per_position() {
    let encoder = Encoder::new_random(20, 8, 16, DType::F32, &test_device()).unwrap();
    let encoded = encoder.forward(&[4, 5, 6, 7]).unwrap();

    assert_eq!(encoded.states.dims(), &[4, 16]);
    assert_eq!(encoded.final_state.dims(), &[1, 16]);
    assert_eq!(encoded.len(), 4);

    // The final state is the state at the last position.
    let last: Vec<f32> = encoded.states.get(3).unwrap().to_vec1().unwrap();
    let fin: Vec<f32> = encoded.final_state.get(0).unwrap().to_vec1().unwrap();
    assert_eq!(last, fin);
}

#[test]
fn test_decoder_step_shapes() {
    let device = test_device();
    let encoder = Encoder::new_random(20, 8, 16, DType::F32, &device).unwrap();
    let decoder = AttentionDecoder::new_random(20, 8, 16, DType::F32, &device).unwrap();
    let encoded = encoder.forward(&[4, 5]).unwrap();

    let step = decoder.step(1, &encoded.final_state, &encoded).unwrap();

    assert_eq!(step.logits.dims(), &[20]);
    assert_eq!(step.state.dims(), &[1, 16]);
    assert_eq!(step.attention.dims(), &[2]);
}

#[test]
fn test_attention_is_a_distribution() {
    let model = small_model();

    for r in 1..=12 {
        let prefix: Vec<u32> = (0..r as u32).map(|i| 4 + i % 16).collect();
        let out = model.step(&prefix, 1).unwrap();

        assert_eq!(out.attention.len(), r);
        let sum: f32 = out.attention.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5, "attention sums to {sum} for r = {r}");
        assert!(out.attention.iter().all(|w| w.is_finite() && *w >= 0.0));
    }
}

#[test]
fn test_attention_stable_for_long_prefix() {
    let model = small_model();
    let prefix: Vec<u32> = (0..200u32).map(|i| 4 + i % 16).collect();

    let out = model.step(&prefix, 7).unwrap();

    let sum: f32 = out.attention.iter().sum();
    assert!((sum - 1.0).abs() < 1e-4);
    assert!(out.logits.iter().all(|l| l.is_finite()));
}

#[test]
fn test_step_is_deterministic() {
    let model = small_model();

    let a = model.step(&[4, 9, 11], 5).unwrap();
    let b = model.step(&[4, 9, 11], 5).unwrap();

    assert_eq!(a.logits, b.logits);
    assert_eq!(a.attention, b.attention);
}

#[test]
fn test_step_matches_encode_then_decode() {
    let model = small_model();

    let direct = model.step(&[6, 7, 8], 1).unwrap();
    let encoded = model.encode(&[6, 7, 8]).unwrap();
    let split = model.decode_step(&encoded, 1).unwrap();

    assert_eq!(direct.logits, split.logits);
}

#[test]
fn test_empty_prefix_is_rejected() {
    let model = small_model();
    assert!(matches!(model.step(&[], 1), Err(Error::EmptySource)));
    assert!(matches!(model.encode(&[]), Err(Error::EmptySource)));
}

#[test]
fn test_model_is_shareable_across_threads() {
    let model = small_model();
    let expected = model.step(&[4, 5, 6], 1).unwrap().logits;

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let model = model.clone();
            std::thread::spawn(move || model.step(&[4, 5, 6], 1).unwrap().logits)
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}
