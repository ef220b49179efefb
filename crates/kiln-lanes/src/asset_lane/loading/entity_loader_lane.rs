// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Entity definition decoding.
//!
//! An entity file starts with `#version N` (1 to 4) followed by statements of
//! the form `identifier value;`. Each version unlocks more statements:
//!
//! | version | statements                                                  |
//! |---------|-------------------------------------------------------------|
//! | 1       | `position x, y, z;`                                         |
//! | 2       | `mesh file.obj;`                                            |
//! | 3       | `scale x, y, z;`                                            |
//! | 4       | `rotation quaternion x, y, z, w;` or `rotation euler x, y, z;` |
//!
//! Euler angles are written in degrees.

use crate::asset_lane::lexer::{Lexer, Token, TokenKind};
use crate::asset_lane::{AssetLoaderLane, DecodeError};
use kiln_core::asset::EntityData;
use kiln_core::math::{degrees_to_radians, Quaternion, Vec3};

/// Highest entity format version understood.
pub const ENTITY_FORMAT_VERSION: u32 = 4;

/// A lane decoding entity text files.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntityLoaderLane;

struct EntityParser<'s> {
    lexer: Lexer<'s>,
}

impl<'s> EntityParser<'s> {
    fn error(token: &Token<'_>, message: impl Into<String>) -> DecodeError {
        DecodeError::parse(token.line, message)
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<Token<'s>, DecodeError> {
        let token = self.lexer.next_token();
        if token.kind == kind {
            Ok(token)
        } else if token.kind == TokenKind::Eof {
            Err(Self::error(&token, format!("unexpected end of file, expected {what}")))
        } else {
            Err(Self::error(&token, format!("expected {what}, got {}", token.describe())))
        }
    }

    fn number(&mut self) -> Result<f32, DecodeError> {
        let token = self.lexer.next_token();
        token
            .as_f32()
            .ok_or_else(|| Self::error(&token, format!("expected number, got {}", token.describe())))
    }

    /// `a, b, ... ;` with exactly `N` numbers.
    fn components<const N: usize>(&mut self) -> Result<[f32; N], DecodeError> {
        let mut out = [0.0; N];
        for (i, slot) in out.iter_mut().enumerate() {
            if i > 0 {
                self.expect(TokenKind::Comma, "','")?;
            }
            *slot = self.number()?;
        }
        self.expect(TokenKind::Semicolon, "';'")?;
        Ok(out)
    }

    fn header(&mut self) -> Result<u32, DecodeError> {
        self.expect(TokenKind::Hash, "version declaration")?;
        let keyword = self.lexer.next_token();
        if !keyword.is_identifier("version") {
            return Err(Self::error(&keyword, "expected version declaration"));
        }
        let number = self.lexer.next_token();
        let version = number
            .as_u32()
            .ok_or_else(|| Self::error(&number, "expected version number"))?;
        if !(1..=ENTITY_FORMAT_VERSION).contains(&version) {
            return Err(Self::error(
                &number,
                format!("unsupported entity version {version}"),
            ));
        }
        Ok(version)
    }

    /// Raw source text up to the terminating `;`, e.g. `models/cube.obj`.
    fn raw_until_semicolon(&mut self) -> Result<&'s str, DecodeError> {
        let first = self.lexer.next_token();
        match first.kind {
            TokenKind::Eof => {
                return Err(Self::error(&first, "unexpected end of file, expected mesh name"))
            }
            TokenKind::Semicolon => return Err(Self::error(&first, "expected mesh name")),
            _ => {}
        }
        let end = loop {
            let token = self.lexer.next_token();
            match token.kind {
                TokenKind::Semicolon => break token.offset,
                TokenKind::Eof => {
                    return Err(Self::error(&token, "unexpected end of file, expected ';'"))
                }
                _ => {}
            }
        };
        let source: &'s str = self.lexer.source();
        Ok(source[first.offset..end].trim())
    }

    fn rotation(&mut self) -> Result<Quaternion, DecodeError> {
        let kind = self.lexer.next_token();
        if kind.is_identifier("quaternion") {
            let [x, y, z, w] = self.components::<4>()?;
            Ok(Quaternion::new(x, y, z, w))
        } else if kind.is_identifier("euler") {
            let [x, y, z] = self.components::<3>()?;
            Ok(Quaternion::from_euler(Vec3::new(
                degrees_to_radians(x),
                degrees_to_radians(y),
                degrees_to_radians(z),
            )))
        } else {
            Err(Self::error(
                &kind,
                format!(
                    "expected \"quaternion\" or \"euler\" after \"rotation\", got {}",
                    kind.describe()
                ),
            ))
        }
    }

    fn parse(mut self) -> Result<EntityData, DecodeError> {
        let version = self.header()?;
        let mut data = EntityData::for_version(version);

        if self.lexer.peek().kind != TokenKind::Identifier {
            let token = self.lexer.next_token();
            return Err(Self::error(
                &token,
                format!("expected identifier, got {}", token.describe()),
            ));
        }

        loop {
            let token = self.lexer.next_token();
            if token.kind == TokenKind::Eof {
                break;
            }

            match token.text {
                "position" => {
                    data.position = Vec3::from(self.components::<3>()?);
                }
                "mesh" if version >= 2 => {
                    data.mesh = self.raw_until_semicolon()?.to_string();
                }
                "scale" if version >= 3 => {
                    data.scale = Vec3::from(self.components::<3>()?);
                }
                "rotation" if version >= 4 => {
                    data.rotation = self.rotation()?;
                }
                _ => {
                    return Err(Self::error(
                        &token,
                        format!("unknown identifier: {}", token.text),
                    ))
                }
            }
        }

        Ok(data)
    }
}

impl AssetLoaderLane<EntityData> for EntityLoaderLane {
    fn load(&self, bytes: &[u8]) -> Result<EntityData, DecodeError> {
        let text = std::str::from_utf8(bytes)?;
        let data = EntityParser {
            lexer: Lexer::new(text),
        }
        .parse()?;
        log::debug!(
            "Decoded entity v{}: mesh '{}' at ({}, {}, {})",
            data.version,
            data.mesh,
            data.position.x,
            data.position.y,
            data.position.z
        );
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use kiln_core::asset::DEFAULT_ENTITY_MESH;

    fn load(src: &str) -> Result<EntityData, DecodeError> {
        EntityLoaderLane.load(src.as_bytes())
    }

    #[test]
    fn version_one_only_sets_position() {
        let data = load("#version 1\nposition 1.5, -2, 3;\n").unwrap();
        assert_eq!(data.position, Vec3::new(1.5, -2.0, 3.0));
        assert_eq!(data.scale, Vec3::ONE);
        assert_eq!(data.rotation, Quaternion::IDENTITY);
        assert_eq!(data.mesh, DEFAULT_ENTITY_MESH);
    }

    #[test]
    fn mesh_defaults_to_the_cube_only_before_version_two() {
        let v1 = load("#version 1\nposition 0, 0, 0;\n").unwrap();
        assert_eq!(v1.mesh, DEFAULT_ENTITY_MESH);

        let v2 = load("#version 2\nposition 0, 0, 0;\n").unwrap();
        assert_eq!(v2.version, 2);
        assert!(v2.mesh.is_empty());

        let v4 = load("#version 4\nscale 2, 2, 2;\n").unwrap();
        assert!(v4.mesh.is_empty());
    }

    #[test]
    fn version_four_reads_every_statement() {
        let src = "#version 4\n\
                   // a rotated, scaled entity\n\
                   position 0, 1, 0;\n\
                   mesh models/teapot.obj;\n\
                   scale 2, 2, 2;\n\
                   rotation quaternion 0, 0, 0.7071, 0.7071;\n";
        let data = load(src).unwrap();
        assert_eq!(data.version, 4);
        assert_eq!(data.mesh, "models/teapot.obj");
        assert_eq!(data.scale, Vec3::new(2.0, 2.0, 2.0));
        assert_eq!(data.rotation, Quaternion::new(0.0, 0.0, 0.7071, 0.7071));
    }

    #[test]
    fn euler_rotation_is_in_degrees() {
        let data = load("#version 4\nrotation euler 0, 0, 90;\n").unwrap();
        let expected = Quaternion::from_axis_angle(Vec3::Z, std::f32::consts::FRAC_PI_2);
        assert_relative_eq!(data.rotation.dot(expected), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn statements_above_the_declared_version_are_unknown() {
        let err = load("#version 2\nposition 0, 0, 0;\nscale 1, 1, 1;\n").unwrap_err();
        assert_eq!(err, DecodeError::parse(3, "unknown identifier: scale"));
    }

    #[test]
    fn missing_terminator_is_an_error() {
        let err = load("#version 1\nposition 0, 0, 0\n").unwrap_err();
        assert!(matches!(err, DecodeError::Parse { ref message, .. } if message.contains("';'")));

        let err = load("#version 2\nmesh cube.obj").unwrap_err();
        assert!(matches!(err, DecodeError::Parse { ref message, .. } if message.contains("end of file")));
    }

    #[test]
    fn header_is_required_and_bounded() {
        assert!(load("position 0, 0, 0;").is_err());
        assert!(load("#version 9\nposition 0, 0, 0;").is_err());
        assert!(load("#version 1\n").is_err());
    }

    #[test]
    fn unknown_rotation_kind_is_an_error() {
        let err = load("#version 4\nrotation matrix 1, 0, 0;\n").unwrap_err();
        assert!(matches!(err, DecodeError::Parse { ref message, .. } if message.contains("quaternion")));
    }
}
