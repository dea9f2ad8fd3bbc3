use std::str::FromStr;

use argh::FromArgs;
use glam::Vec3;

/// Load a Quake3 BSP, fly a camera through it for a number of frames and
/// report what the visibility pipeline did
#[derive(Debug, Clone, FromArgs)]
pub struct CLIOptions {
    /// verbose level: off, error, warn, info, debug, trace
    #[argh(option)]
    pub verbose: Option<log::LevelFilter>,
    /// path to the .bsp to load
    #[argh(option, default = "Default::default()")]
    pub map: String,
    /// directory textures are looked up in, usually the unpacked pk3 root
    #[argh(option)]
    pub textures: Option<String>,
    /// camera start as x,y,z. Defaults to the map's spawn point
    #[argh(option)]
    pub position: Option<Position>,
    /// camera yaw in degrees
    #[argh(option)]
    pub yaw: Option<f32>,
    /// camera pitch in degrees
    #[argh(option, default = "0.0")]
    pub pitch: f32,
    /// vertical field of view in degrees
    #[argh(option)]
    pub fov: Option<f32>,
    /// number of frames to render
    #[argh(option)]
    pub frames: Option<u32>,
    /// units the camera moves forward each frame
    #[argh(option, default = "0.0")]
    pub speed: f32,
    /// degrees the camera turns each frame
    #[argh(option, default = "0.0")]
    pub turn: f32,
    /// patch tessellation level
    #[argh(option)]
    pub tess_level: Option<u32>,
    /// rotate the map from Z-up to Y-up on load
    #[argh(option)]
    pub swizzle: Option<bool>,
}

/// A point given as `x,y,z`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position(pub Vec3);

impl FromStr for Position {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return Err(format!("expected x,y,z but got {:?}", s));
        }
        let mut v = [0.0; 3];
        for (out, part) in v.iter_mut().zip(parts) {
            *out = part
                .parse()
                .map_err(|e| format!("invalid coordinate {:?}: {}", part, e))?;
        }
        Ok(Position(Vec3::from_array(v)))
    }
}

#[cfg(test)]
mod tests {
    use argh::FromArgs;
    use glam::Vec3;

    use crate::cli::{CLIOptions, Position};

    #[test]
    fn parse_position() {
        assert_eq!(
            "1, -2.5,300".parse::<Position>(),
            Ok(Position(Vec3::new(1.0, -2.5, 300.0)))
        );
        assert!("1,2".parse::<Position>().is_err());
        assert!("1,2,z".parse::<Position>().is_err());
    }

    #[test]
    fn parse_args() {
        let opts = CLIOptions::from_args(
            &["q3view"],
            &[
                "--map",
                "maps/q3dm17.bsp",
                "--position",
                "0,0,64",
                "--frames",
                "10",
                "--swizzle",
                "true",
                "--verbose",
                "debug",
            ],
        )
        .unwrap();
        assert_eq!(opts.map, "maps/q3dm17.bsp");
        assert_eq!(opts.position, Some(Position(Vec3::new(0.0, 0.0, 64.0))));
        assert_eq!(opts.frames, Some(10));
        assert_eq!(opts.swizzle, Some(true));
        assert_eq!(opts.verbose, Some(log::LevelFilter::Debug));
        assert_eq!(opts.speed, 0.0);
        assert_eq!(opts.turn, 0.0);
        assert!(opts.textures.is_none());
    }
}
