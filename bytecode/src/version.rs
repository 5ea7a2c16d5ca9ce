/*
 *     This file is part of Classweave.
 *
 *     Classweave is free software: you can redistribute it and/or modify
 *     it under the terms of the GNU Lesser General Public License as published by
 *     the Free Software Foundation, either version 3 of the License, or
 *     (at your option) any later version.
 *
 *     Classweave is distributed in the hope that it will be useful,
 *     but WITHOUT ANY WARRANTY; without even the implied warranty of
 *     MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *     GNU General Public License for more details.
 *
 *     You should have received a copy of the GNU Lesser General Public License
 *     along with Classweave. (LICENSE.md)  If not, see <https://www.gnu.org/licenses/>.
 */
//! The class file version header.

use std::fmt::{Display, Formatter, Result};

/// The version of a class file, in the order it appears in the file.
///
/// The major version is kept as a plain number so that versions newer than this crate
/// still round-trip.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, ReadWrite)]
pub struct ClassVersion {
    pub minor: u16,
    pub major: u16,
}

impl ClassVersion {
    pub const J1_1: ClassVersion = ClassVersion::new(45, 3);
    pub const J5: ClassVersion = ClassVersion::new(49, 0);
    pub const J6: ClassVersion = ClassVersion::new(50, 0);
    pub const J7: ClassVersion = ClassVersion::new(51, 0);
    pub const J8: ClassVersion = ClassVersion::new(52, 0);
    pub const J11: ClassVersion = ClassVersion::new(55, 0);
    pub const J17: ClassVersion = ClassVersion::new(61, 0);
    pub const J21: ClassVersion = ClassVersion::new(65, 0);

    pub const fn new(major: u16, minor: u16) -> Self {
        ClassVersion { minor, major }
    }

    /// Whether methods of this version may carry a `StackMapTable`.
    pub fn has_stack_maps(&self) -> bool {
        self.major >= 50
    }

    /// Minor version 65535 marks a class compiled with preview features.
    pub fn is_preview(&self) -> bool {
        self.major >= 56 && self.minor == 0xFFFF
    }
}

impl Display for ClassVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self.major {
            45 if self.minor <= 3 => write!(f, "JDK 1.0.2 minor version {}", self.minor),
            45 => write!(f, "JDK 1.1 minor version {}", self.minor),
            46..=48 => write!(f, "JDK 1.{} minor version {}", self.major - 44, self.minor),
            49 | 50 => write!(f, "Java SE {}.0 minor version {}", self.major - 44, self.minor),
            51..=u16::MAX => write!(f, "Java SE {} minor version {}", self.major - 44, self.minor),
            _ => write!(f, "unknown major version {} minor version {}", self.major, self.minor),
        }
    }
}
