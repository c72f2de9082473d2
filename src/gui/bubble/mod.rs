// --- GLOW BUBBLE VARIANTS ---
// Two sibling avatars driven purely by wall-clock easing, no particle
// state. They share the orb's click-to-activate contract.

mod glow;
mod soft_glow;

pub use glow::GlowBubble;
pub use soft_glow::SoftGlowBubble;

/// 0 -> -amplitude -> 0 float bob over `period` seconds.
pub(crate) fn float_offset(time: f64, period: f64, amplitude: f32) -> f32 {
    let phase = (time % period) / period;
    -amplitude * 0.5 * (1.0 - (phase * std::f64::consts::TAU).cos() as f32)
}

#[cfg(test)]
mod tests {
    use super::float_offset;

    #[test]
    fn float_bob_cycles_through_zero_and_peak() {
        let period = 6.0;
        assert!(float_offset(0.0, period, 10.0).abs() < 1e-4);
        assert!((float_offset(period / 2.0, period, 10.0) + 10.0).abs() < 1e-3);
        assert!(float_offset(period, period, 10.0).abs() < 1e-3);
    }

    #[test]
    fn float_bob_never_overshoots() {
        for i in 0..600 {
            let t = i as f64 * 0.01 * 6.0;
            let dy = float_offset(t, 6.0, 10.0);
            assert!((-10.0 - 1e-3..=1e-3).contains(&dy));
        }
    }
}
