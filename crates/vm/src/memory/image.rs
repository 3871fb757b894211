//! Defines the [`Image`] type.

use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

use crate::error::Error;

/// The initial contents of the memory of an Intcode program.
///
/// # Textual format
///
/// Images are usually distributed as a single line of comma-separated decimal integers, such as
/// `1,9,10,3,2,3,11,0,99,30,40,50`. Whitespace around the line and around individual tokens is
/// ignored. The [`Display`](fmt::Display) implementation produces the canonical form of that
/// text.
///
/// An image is never modified by running a program. Each [`IntcodeVM`](crate::IntcodeVM) works on
/// its own copy, which means that a single image can be used to start any number of independent
/// machines.
#[derive(Default, Debug, Clone, PartialEq, Eq, Hash)]
pub struct Image(Box<[i64]>);

impl Image {
    /// Returns the cells of the image.
    #[inline(always)]
    pub fn as_slice(&self) -> &[i64] {
        &self.0
    }

    /// Consumes the image and returns its cells.
    #[inline(always)]
    pub fn into_inner(self) -> Box<[i64]> {
        self.0
    }
}

impl Deref for Image {
    type Target = [i64];

    #[inline(always)]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<i64>> for Image {
    #[inline(always)]
    fn from(value: Vec<i64>) -> Self {
        Self(value.into_boxed_slice())
    }
}

impl From<&[i64]> for Image {
    #[inline(always)]
    fn from(value: &[i64]) -> Self {
        Self(value.into())
    }
}

impl FromStr for Image {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(Self::default());
        }

        s.split(',')
            .enumerate()
            .map(|(index, token)| {
                let token = token.trim();
                token.parse::<i64>().map_err(|_| Error::Parse {
                    index,
                    token: token.to_owned(),
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self::from)
    }
}

impl fmt::Display for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut cells = self.0.iter();

        if let Some(first) = cells.next() {
            write!(f, "{first}")?;
            for cell in cells {
                write!(f, ",{cell}")?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_signed_values_and_trims() {
        let image: Image = " 109,1, 204,-1,+3\n".parse().unwrap();
        assert_eq!(image.as_slice(), &[109, 1, 204, -1, 3]);
    }

    #[test]
    fn empty_text_is_an_empty_image() {
        let image: Image = "  \n".parse().unwrap();
        assert!(image.is_empty());
        assert_eq!(image.to_string(), "");
    }

    #[test]
    fn reports_the_offending_token() {
        let err = "1,2,x3,4".parse::<Image>().unwrap_err();
        assert_eq!(
            err,
            Error::Parse {
                index: 2,
                token: "x3".to_owned(),
            }
        );

        let err = "1,2,".parse::<Image>().unwrap_err();
        assert_eq!(
            err,
            Error::Parse {
                index: 2,
                token: String::new(),
            }
        );
    }

    #[test]
    fn displays_canonical_text() {
        let image = Image::from(vec![1002, 4, 3, 4, -33]);
        assert_eq!(image.to_string(), "1002,4,3,4,-33");
        assert_eq!(image.to_string().parse::<Image>().unwrap(), image);
    }
}
