//! The entity lump is plain text:
//!
//! ```text,ignore
//! {
//! "classname" "worldspawn"
//! "message" "The Longest Yard"
//! }
//! {
//! "classname" "info_player_deathmatch"
//! "origin" "-64 320 56"
//! "angle" "90"
//! }
//! ```
//!
//! Only what the viewer needs is pulled out of it: spawn points.

use glam::Vec3;
use log::warn;

/// One `{ ... }` block. Keys may repeat in hand edited maps, the first wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Entity {
    pub fields: Vec<(String, String)>,
}

impl Entity {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn classname(&self) -> Option<&str> {
        self.get("classname")
    }

    pub fn origin(&self) -> Option<Vec3> {
        parse_vec3(self.get("origin")?)
    }

    /// Yaw in degrees
    pub fn angle(&self) -> Option<f32> {
        self.get("angle")?.trim().parse().ok()
    }
}

fn parse_vec3(s: &str) -> Option<Vec3> {
    let mut it = s.split_whitespace().map(|p| p.parse::<f32>());
    let v = Vec3::new(it.next()?.ok()?, it.next()?.ok()?, it.next()?.ok()?);
    Some(v)
}

#[derive(Debug, PartialEq)]
enum Token<'a> {
    Open,
    Close,
    Str(&'a str),
}

fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'{' => {
                tokens.push(Token::Open);
                i += 1;
            }
            b'}' => {
                tokens.push(Token::Close);
                i += 1;
            }
            b'"' => {
                let start = i + 1;
                let end = text[start..]
                    .find('"')
                    .map(|e| start + e)
                    .unwrap_or(bytes.len());
                tokens.push(Token::Str(&text[start..end]));
                i = end + 1;
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                // comment to end of line
                i = text[i..].find('\n').map(|e| i + e).unwrap_or(bytes.len());
            }
            _ => i += 1,
        }
    }
    tokens
}

/// Parse the entity text. Malformed blocks are skipped with a warning rather
/// than failing the level, the geometry does not depend on them.
pub fn parse_entities(text: &str) -> Vec<Entity> {
    let mut entities = Vec::new();
    let mut current: Option<Entity> = None;
    let mut pending_key: Option<&str> = None;

    for token in tokenize(text) {
        match token {
            Token::Open => {
                if current.is_some() {
                    warn!("Nested entity block, dropping the unfinished one");
                }
                current = Some(Entity::default());
                pending_key = None;
            }
            Token::Close => {
                match current.take() {
                    Some(ent) => entities.push(ent),
                    None => warn!("Unbalanced '}}' in entity lump"),
                }
                pending_key = None;
            }
            Token::Str(s) => {
                let Some(ent) = current.as_mut() else {
                    warn!("Entity string {:?} outside of a block", s);
                    continue;
                };
                match pending_key.take() {
                    Some(key) => {
                        if ent.get(key).is_none() {
                            ent.fields.push((key.to_owned(), s.to_owned()));
                        }
                    }
                    None => pending_key = Some(s),
                }
            }
        }
    }
    entities
}

/// Find somewhere sensible to put the camera: the first deathmatch spawn,
/// falling back to the single player start.
pub fn spawn_point(entities: &[Entity]) -> Option<(Vec3, f32)> {
    ["info_player_deathmatch", "info_player_start"]
        .iter()
        .find_map(|class| {
            entities
                .iter()
                .filter(|e| e.classname() == Some(*class))
                .find_map(|e| e.origin().map(|o| (o, e.angle().unwrap_or(0.0))))
        })
}
