// --- ORB PHYSICS & PAINT ---
// Per-frame particle update and the layered glow drawing pass.

use super::scene::{canvas_center, Lcg, Particle};
use super::{
    C_BG_CENTER, C_BG_EDGE, C_CORE_ACTIVE_IN, C_CORE_ACTIVE_MID, C_CORE_ACTIVE_OUT,
    C_CORE_IDLE_IN, C_CORE_IDLE_MID, C_CORE_IDLE_OUT, C_GLOW, C_LINK,
};
use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2};

// --- TUNING ---
// The stable orbit annulus sits between INNER_RADIUS and OUTER_RADIUS:
// outside it, a restoring force proportional to the center offset applies.
const OUTER_RADIUS: f32 = 90.0;
const INNER_RADIUS: f32 = 40.0;
const CENTER_FORCE: f32 = 0.002;
const POINTER_FORCE: f32 = 0.01;
const POINTER_RANGE: f32 = 50.0;
const MAX_SPEED: f32 = 1.5;
const FRICTION: f32 = 0.98;
const GROW_STEP: f32 = 0.05;
const LINK_RANGE: f32 = 30.0;
const PARTICLE_BASE_ALPHA: f32 = 0.7;

/// Advance every particle one frame: annulus restoring forces, pointer
/// repulsion, speed clamp, integration, friction, size pulse. The pulse
/// bounds are re-rolled at every direction flip so the oscillation never
/// settles into a visible period.
pub fn step(particles: &mut [Particle], hover: Option<Pos2>, rng: &mut Lcg) {
    let center = canvas_center();

    for p in particles.iter_mut() {
        let offset = p.pos - center;
        let distance = offset.length();

        if distance > OUTER_RADIUS {
            p.vel -= offset * CENTER_FORCE;
        } else if distance < INNER_RADIUS {
            p.vel += offset * CENTER_FORCE;
        }

        if let Some(pointer) = hover {
            let away = p.pos - pointer;
            if away.length() < POINTER_RANGE {
                p.vel += away * POINTER_FORCE;
            }
        }

        let speed = p.vel.length();
        if speed > MAX_SPEED {
            p.vel = p.vel / speed * MAX_SPEED;
        }

        p.pos += p.vel;
        p.vel *= FRICTION;

        if p.growing {
            p.size += GROW_STEP;
            if p.size > 4.0 + rng.next_f32() * 2.0 {
                p.growing = false;
            }
        } else {
            p.size -= GROW_STEP;
            if p.size < 1.0 + rng.next_f32() * 2.0 {
                p.growing = true;
            }
        }
    }
}

/// Paint one frame into `rect` (canvas coordinates map 1:1 onto it).
pub fn paint(painter: &Painter, rect: Rect, particles: &[Particle], active: bool, time: f64) {
    let to_screen = |p: Pos2| rect.min + p.to_vec2();
    let center = to_screen(canvas_center());

    // 1. Dark background disc, edge-to-center layered gradient
    painter.circle_filled(center, 90.0, C_BG_EDGE.linear_multiply(0.7));
    painter.circle_filled(center, 60.0, C_BG_CENTER.linear_multiply(0.5));
    painter.circle_filled(center, 35.0, C_BG_CENTER.linear_multiply(0.9));

    // 2. Outer glow ring fading to transparent
    painter.circle_filled(center, 110.0, C_GLOW.linear_multiply(0.05));
    painter.circle_filled(center, 95.0, C_GLOW.linear_multiply(0.14));

    // 3. Bright core; gradient center sits up-left of the disc center
    let gradient_center = center + Vec2::new(-10.0, -10.0);
    let (c_in, c_mid, c_out, a_in, a_mid, a_out) = if active {
        (C_CORE_ACTIVE_IN, C_CORE_ACTIVE_MID, C_CORE_ACTIVE_OUT, 0.9, 0.7, 0.25)
    } else {
        (C_CORE_IDLE_IN, C_CORE_IDLE_MID, C_CORE_IDLE_OUT, 0.8, 0.6, 0.2)
    };
    painter.circle_filled(center, 30.0, c_out.linear_multiply(a_out));
    painter.circle_filled(gradient_center, 22.0, c_mid.linear_multiply(a_mid));
    painter.circle_filled(gradient_center, 10.0, c_in.linear_multiply(a_in));

    // 4. Specular highlight dot
    painter.circle_filled(
        gradient_center,
        8.0,
        Color32::WHITE.linear_multiply(0.7),
    );

    // 5. Particles plus constellation lines. The pair pass is O(n^2); fine
    // at 60 particles, needs a grid before scaling the count up.
    let boost = if active { 1.3 } else { 1.0 };
    for (i, p) in particles.iter().enumerate() {
        let alpha = (p.alpha * boost).min(1.0) * PARTICLE_BASE_ALPHA;
        painter.circle_filled(to_screen(p.pos), p.size.max(0.0), p.color.linear_multiply(alpha));

        for other in &particles[i + 1..] {
            let pair_distance = (p.pos - other.pos).length();
            if pair_distance < LINK_RANGE {
                let link_alpha = 0.1 * (1.0 - pair_distance / LINK_RANGE);
                painter.line_segment(
                    [to_screen(p.pos), to_screen(other.pos)],
                    Stroke::new(0.5, C_LINK.linear_multiply(link_alpha)),
                );
            }
        }
    }

    // 6. Pulsing ring, wall-clock driven (~1s period), active only
    if active {
        let ring_radius = 90.0 + (time * 2.0).sin() as f32 * 5.0;
        painter.circle_stroke(
            center,
            ring_radius,
            Stroke::new(2.0, C_GLOW.linear_multiply(0.3)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::super::scene::{canvas_center, init_particles, Lcg, Particle, CANVAS_SIZE};
    use super::*;
    use eframe::egui::{Pos2, Vec2};

    fn particle_at(pos: Pos2, vel: Vec2) -> Particle {
        Particle {
            pos,
            vel,
            size: 3.0,
            color: super::super::PALETTE[0],
            alpha: 0.3,
            growing: true,
        }
    }

    #[test]
    fn speed_never_exceeds_ceiling_after_step() {
        let mut rng = Lcg::with_seed(11);
        let mut particles = init_particles(&mut rng);
        // Kick everything hard in random directions
        for (i, p) in particles.iter_mut().enumerate() {
            p.vel = Vec2::new(10.0 - i as f32, i as f32 * 0.7);
        }
        step(&mut particles, None, &mut rng);
        for p in &particles {
            // Clamp happens before friction, so post-step speed is below it
            assert!(p.vel.length() <= MAX_SPEED + 1e-4);
        }
    }

    #[test]
    fn outside_annulus_pulls_inward() {
        let center = canvas_center();
        // 95 from center along +x, beyond the 90 boundary
        let mut particles = vec![particle_at(center + Vec2::new(95.0, 0.0), Vec2::new(0.5, 0.0))];
        let radial_before = particles[0].vel.x;

        let mut rng = Lcg::with_seed(3);
        step(&mut particles, None, &mut rng);

        // The correction acts along -x here, so the radial component drops
        assert!(particles[0].vel.x < radial_before);
        let expected = (0.5 - 95.0 * CENTER_FORCE) * FRICTION;
        assert!((particles[0].vel.x - expected).abs() < 1e-4);
    }

    #[test]
    fn inside_core_pushes_outward() {
        let center = canvas_center();
        let mut particles = vec![particle_at(center + Vec2::new(20.0, 0.0), Vec2::ZERO)];

        let mut rng = Lcg::with_seed(3);
        step(&mut particles, None, &mut rng);

        assert!(particles[0].vel.x > 0.0, "expected outward push below r=40");
    }

    #[test]
    fn annulus_interior_integrates_velocity_only() {
        // Spec scenario: angle 0, distance 50 -> center + (50, 0)
        let center = canvas_center();
        let mut particles =
            vec![particle_at(center + Vec2::new(50.0, 0.0), Vec2::new(0.2, 0.0))];

        let mut rng = Lcg::with_seed(9);
        step(&mut particles, None, &mut rng);

        let p = &particles[0];
        assert!((p.pos.x - (center.x + 50.2)).abs() < 1e-4);
        assert!((p.pos.y - center.y).abs() < 1e-4);
        assert!((p.vel.x - 0.2 * FRICTION).abs() < 1e-4);
        assert_eq!(p.vel.y, 0.0);
    }

    #[test]
    fn hover_repels_nearby_particles() {
        let center = canvas_center();
        let pos = center + Vec2::new(50.0, 0.0);
        let mut particles = vec![particle_at(pos, Vec2::ZERO)];
        // Pointer 10 units left of the particle
        let pointer = Pos2::new(pos.x - 10.0, pos.y);

        let mut rng = Lcg::with_seed(5);
        step(&mut particles, Some(pointer), &mut rng);

        // Velocity gains a component pointing away from the pointer (+x)
        assert!(particles[0].vel.x > 0.0);
    }

    #[test]
    fn hover_outside_range_is_inert() {
        let center = canvas_center();
        let pos = center + Vec2::new(50.0, 0.0);
        let mut particles = vec![particle_at(pos, Vec2::ZERO)];
        let pointer = Pos2::new(pos.x - POINTER_RANGE - 20.0, pos.y);

        let mut rng = Lcg::with_seed(5);
        step(&mut particles, Some(pointer), &mut rng);

        assert_eq!(particles[0].vel, Vec2::ZERO);
    }

    #[test]
    fn size_pulse_stays_inside_global_bounds() {
        let mut rng = Lcg::with_seed(21);
        let mut particles = init_particles(&mut rng);
        for _ in 0..2_000 {
            step(&mut particles, None, &mut rng);
            for p in &particles {
                // Flip bounds live in [1, 3] and [4, 6]; one extra step of
                // slack on either side before the flip lands
                assert!(p.size >= 1.0 - GROW_STEP - 1e-4);
                assert!(p.size <= 6.0 + GROW_STEP + 1e-4);
            }
        }
    }

    #[test]
    fn long_run_keeps_cloud_near_canvas() {
        let mut rng = Lcg::with_seed(33);
        let mut particles = init_particles(&mut rng);
        for _ in 0..5_000 {
            step(&mut particles, None, &mut rng);
        }
        let center = canvas_center();
        for p in &particles {
            let distance = (p.pos - center).length();
            // No hard walls, but the restoring force keeps everything well
            // inside the canvas
            assert!(distance < CANVAS_SIZE, "particle escaped to {}", distance);
        }
    }
}
