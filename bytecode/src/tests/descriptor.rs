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
use pretty_assertions::assert_eq;

use crate::descriptor::{FieldType, MethodDescriptor};
use crate::Error;

#[test]
fn field_types() {
    assert_eq!("I".parse::<FieldType>().unwrap(), FieldType::Int);
    assert_eq!(
        "Ljava/util/List;".parse::<FieldType>().unwrap(),
        FieldType::Object("java/util/List".to_owned())
    );
    let matrix: FieldType = "[[D".parse().unwrap();
    assert_eq!(matrix, FieldType::Array(Box::new(FieldType::Array(Box::new(FieldType::Double)))));
    assert_eq!(matrix.dimensions(), 2);
    assert_eq!(matrix.slots(), 1);
    assert_eq!(FieldType::Long.slots(), 2);
    assert_eq!(matrix.to_string(), "double[][]");
    assert_eq!("[Ljava/lang/String;".parse::<FieldType>().unwrap().to_string(), "java.lang.String[]");
}

#[test]
fn method_descriptors() {
    let d: MethodDescriptor = "(IJ[Ljava/lang/Object;Z)V".parse().unwrap();
    assert_eq!(
        d,
        MethodDescriptor {
            parameters: vec![
                FieldType::Int,
                FieldType::Long,
                FieldType::Array(Box::new(FieldType::Object("java/lang/Object".to_owned()))),
                FieldType::Boolean
            ],
            return_type: None,
        }
    );
    assert_eq!(d.to_string(), "(int, long, java.lang.Object[], boolean)void");
    assert_eq!("()[B".parse::<MethodDescriptor>().unwrap().to_string(), "()byte[]");
}

#[test]
fn malformed_descriptors() {
    for bad in ["", "V", "L;", "Ljava/lang/Object", "II", "[", "Q"] {
        assert!(
            matches!(bad.parse::<FieldType>(), Err(Error::Invalid("field descriptor", _))),
            "{:?} parsed",
            bad
        );
    }
    for bad in ["", "()", "(V)V", "(I", "()VV", "I)V"] {
        assert!(
            matches!(bad.parse::<MethodDescriptor>(), Err(Error::Invalid("method descriptor", _))),
            "{:?} parsed",
            bad
        );
    }
}

#[test]
fn array_dimensions_are_capped() {
    let deepest = format!("{}I", "[".repeat(255));
    let t: FieldType = deepest.parse().unwrap();
    assert_eq!(t.dimensions(), 255);

    let too_deep = format!("{}I", "[".repeat(256));
    assert!(matches!(too_deep.parse::<FieldType>(), Err(Error::Invalid("field descriptor", _))));

    let hostile = format!("({}I)V", "[".repeat(60_000));
    assert!(matches!(hostile.parse::<MethodDescriptor>(), Err(Error::Invalid("method descriptor", _))));
}
