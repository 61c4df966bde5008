//! Post-processing of planned paths.

use super::Pose;

/// Orients each intermediate waypoint along the segment that leads to it. The first and last
/// poses keep their yaw.
pub fn fill_path_yaws(path: &[Pose]) -> Vec<Pose> {
    let mut filled = path.to_vec();
    for idx in 1..path.len().saturating_sub(1) {
        let heading = path[idx - 1].position().heading_to(path[idx].position());
        filled[idx] = path[idx].with_yaw(heading);
    }
    filled
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_fill_path_yaws() {
        let path = [
            Pose::new(0.0, 0.0, 1.0),
            Pose::new(2.0, 0.0, 0.0),
            Pose::new(2.0, 2.0, 0.0),
            Pose::new(0.0, 2.0, -1.0),
        ];
        let filled = fill_path_yaws(&path);
        assert_eq!(filled[0], path[0]);
        assert!(filled[1].is_close(&Pose::new(2.0, 0.0, 0.0), 1e-9));
        assert!(filled[2].is_close(&Pose::new(2.0, 2.0, FRAC_PI_2), 1e-9));
        assert_eq!(filled[3], path[3]);
    }

    #[test]
    fn test_short_paths_unchanged() {
        assert_eq!(fill_path_yaws(&[]), Vec::<Pose>::new());
        let path = [Pose::new(0.0, 0.0, 0.5), Pose::new(1.0, 1.0, -0.5)];
        assert_eq!(fill_path_yaws(&path), path.to_vec());
    }
}
