use crate::maze::{Orientation, Wall};
use crate::params::SimConstants;
use crate::particle::Particle;
use glam::Vec2;

/// Collisions observed during one integration pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Contacts {
    /// Some particle hit the bottom of the domain
    pub reached_bottom: bool,
    pub boundary_hits: usize,
    pub wall_hits: usize,
}

/// Advance every particle one step with semi-implicit Euler, then resolve
/// collisions against the domain box and the maze walls.
pub fn integrate(particles: &mut [Particle], walls: &[Wall], constants: &SimConstants) -> Contacts {
    let mut contacts = Contacts::default();
    for p in particles.iter_mut() {
        advance(p, constants);
        confine_to_box(p, constants, &mut contacts);
        for wall in walls {
            if deflect(p, wall, constants) {
                contacts.wall_hits += 1;
            }
        }
        // Mirroring off a wall near the edge may push past the box again
        let h = constants.params.smoothing_radius;
        p.pos = p.pos.clamp(
            Vec2::splat(h),
            Vec2::new(constants.params.domain_width - h, constants.params.domain_height - h),
        );
    }
    contacts
}

fn advance(p: &mut Particle, constants: &SimConstants) {
    let params = &constants.params;
    if p.density > 0.0 && p.density.is_finite() {
        p.vel += params.time_step * p.force / p.density;
    }
    if p.vel.length() < params.rest_speed {
        p.vel = Vec2::ZERO;
    }
    p.pos += params.time_step * p.vel;
}

fn confine_to_box(p: &mut Particle, constants: &SimConstants, contacts: &mut Contacts) {
    let params = &constants.params;
    let h = params.smoothing_radius;
    let damping = params.boundary_damping;

    if p.pos.x - h < 0.0 {
        p.vel.x *= damping;
        p.pos.x = h;
        contacts.boundary_hits += 1;
    }
    if p.pos.x + h > params.domain_width {
        p.vel.x *= damping;
        p.pos.x = params.domain_width - h;
        contacts.boundary_hits += 1;
    }
    if p.pos.y - h < 0.0 {
        p.vel.y *= damping;
        p.pos.y = h;
        contacts.boundary_hits += 1;
        contacts.reached_bottom = true;
    }
    if p.pos.y + h > params.domain_height {
        p.vel.y *= damping;
        p.pos.y = params.domain_height - h;
        contacts.boundary_hits += 1;
    }
}

/// Bounce `p` off `wall` if it is within half a smoothing radius of it.
/// Returns whether a bounce happened.
fn deflect(p: &mut Particle, wall: &Wall, constants: &SimConstants) -> bool {
    let radius = constants.wall_radius();
    let damping = constants.params.boundary_damping;

    match wall.orientation {
        Orientation::Vertical => {
            let offset = p.pos.x - wall.start.x;
            if offset.abs() <= radius && (wall.start.y..=wall.end.y).contains(&p.pos.y) {
                p.vel.x *= damping;
                p.pos.x += offset;
                return true;
            }
        }
        Orientation::Horizontal => {
            let offset = p.pos.y - wall.start.y;
            if offset.abs() <= radius && (wall.start.x..=wall.end.x).contains(&p.pos.x) {
                p.vel.y *= damping;
                p.pos.y += offset;
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moving(x: f32, y: f32, vx: f32, vy: f32) -> Particle {
        let mut p = Particle::new(0, Vec2::new(x, y));
        p.vel = Vec2::new(vx, vy);
        p
    }

    #[test]
    fn test_free_flight() {
        let c = SimConstants::default();
        let dt = c.params.time_step;
        let mut particles = [moving(400.0, 400.0, 10.0, -20.0)];
        particles[0].density = 2.0;
        particles[0].force = Vec2::new(0.0, -4.0);

        let contacts = integrate(&mut particles, &[], &c);

        let vel = Vec2::new(10.0, -20.0 + dt * -4.0 / 2.0);
        assert_eq!(particles[0].vel, vel);
        assert_eq!(particles[0].pos, Vec2::new(400.0, 400.0) + dt * vel);
        assert_eq!(contacts, Contacts::default());
    }

    #[test]
    fn test_slow_particles_snap_to_rest() {
        let c = SimConstants::default();
        let mut particles = [moving(400.0, 400.0, 1e-6, -1e-6)];

        integrate(&mut particles, &[], &c);

        assert_eq!(particles[0].vel, Vec2::ZERO);
        assert_eq!(particles[0].pos, Vec2::new(400.0, 400.0));
    }

    #[test]
    fn test_zero_density_skips_acceleration() {
        let c = SimConstants::default();
        let mut particles = [moving(400.0, 400.0, 3.0, 0.0)];
        particles[0].force = Vec2::new(100.0, 100.0);

        integrate(&mut particles, &[], &c);

        assert_eq!(particles[0].vel, Vec2::new(3.0, 0.0));
        assert!(particles[0].pos.is_finite());
    }

    #[test]
    fn test_bottom_clamps_exactly_and_flips() {
        let c = SimConstants::default();
        let h = c.params.smoothing_radius;
        let mut particles = [moving(400.0, h, 0.0, -10.0)];

        let contacts = integrate(&mut particles, &[], &c);

        assert_eq!(particles[0].pos.y, h);
        assert_eq!(particles[0].vel.y, -10.0 * c.params.boundary_damping);
        assert!(particles[0].vel.y > 0.0);
        assert!(contacts.reached_bottom);
    }

    #[test]
    fn test_side_and_top_boundaries() {
        let c = SimConstants::default();
        let h = c.params.smoothing_radius;
        let w = c.params.domain_width;
        let top = c.params.domain_height;
        let mut particles = [
            moving(h, 500.0, -40.0, 0.0),
            moving(w - h, 500.0, 40.0, 0.0),
            moving(400.0, top - h, 0.0, 40.0),
        ];

        let contacts = integrate(&mut particles, &[], &c);

        assert_eq!(particles[0].pos.x, h);
        assert_eq!(particles[0].vel.x, 20.0);
        assert_eq!(particles[1].pos.x, w - h);
        assert_eq!(particles[1].vel.x, -20.0);
        assert_eq!(particles[2].pos.y, top - h);
        assert_eq!(particles[2].vel.y, -20.0);
        assert_eq!(contacts.boundary_hits, 3);
        assert!(!contacts.reached_bottom);
    }

    #[test]
    fn test_vertical_wall_reflects() {
        let c = SimConstants::default();
        let wall = Wall::vertical(500.0, 300.0, 400.0);
        let mut particles = [moving(497.0, 350.0, 30.0, 0.0)];

        let contacts = integrate(&mut particles, &[wall], &c);

        let dt = c.params.time_step;
        let x = 497.0 + dt * 30.0;
        assert_eq!(particles[0].vel.x, 30.0 * c.params.boundary_damping);
        assert!((particles[0].pos.x - (x + (x - 500.0))).abs() < 1e-4);
        assert_eq!(contacts.wall_hits, 1);
    }

    #[test]
    fn test_horizontal_wall_reflects() {
        let c = SimConstants::default();
        let wall = Wall::horizontal(300.0, 400.0, 600.0);
        let mut particles = [moving(350.0, 605.0, 0.0, -50.0)];

        integrate(&mut particles, &[wall], &c);

        let dt = c.params.time_step;
        let y = 605.0 - dt * 50.0;
        assert_eq!(particles[0].vel.y, 25.0);
        assert!((particles[0].pos.y - (y + (y - 600.0))).abs() < 1e-4);
    }

    #[test]
    fn test_wall_extent_is_respected() {
        let c = SimConstants::default();
        let walls = [
            Wall::vertical(500.0, 300.0, 400.0),
            Wall::horizontal(300.0, 400.0, 600.0),
        ];
        let mut particles = [
            moving(499.0, 450.0, 30.0, 0.0),  // beyond the vertical wall's end
            moving(450.0, 601.0, 0.0, -30.0), // beside the horizontal wall
            moving(480.0, 350.0, 30.0, 0.0),  // out of reach
        ];

        let contacts = integrate(&mut particles, &walls, &c);

        assert_eq!(contacts.wall_hits, 0);
        assert_eq!(particles[0].vel.x, 30.0);
        assert_eq!(particles[1].vel.y, -30.0);
        assert_eq!(particles[2].vel.x, 30.0);
    }

    #[test]
    fn test_damping_shrinks_normal_speed() {
        let c = SimConstants::default();
        let wall = Wall::vertical(500.0, 0.0, 1000.0);
        for vx in [-80.0_f32, -3.0, 3.0, 80.0] {
            let mut particles = [moving(500.0, 500.0, vx, 7.0)];
            integrate(&mut particles, &[wall], &c);
            let after = particles[0].vel.x;
            assert_eq!(after.signum(), -vx.signum());
            assert!(after.abs() < vx.abs());
            assert_eq!(particles[0].vel.y, 7.0);
        }
    }

    #[test]
    fn test_wall_push_stays_inside_box() {
        let c = SimConstants::default();
        let h = c.params.smoothing_radius;
        let wall = Wall::vertical(18.0, 0.0, 1000.0);
        let mut particles = [moving(h + 0.001, 500.0, 0.0, 0.0)];

        integrate(&mut particles, &[wall], &c);

        assert!(particles[0].pos.x >= h);
    }
}
