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
//! The opcode table.
//!
//! Every assigned opcode of the JVM instruction set, together with its mnemonic, the shape of
//! the operands that follow it in the code array, and the anchor of its entry in chapter 6 of
//! the JVM specification. Bytes `0xcb..=0xfd` are unassigned and have no `Opcode`.

use std::convert::TryFrom;
use std::fmt::{Display, Formatter};

use crate::error::Error;

/// Base URL that [`Opcode::doc_anchor`] is relative to.
pub const JVMS_CHAPTER_6: &str = "https://docs.oracle.com/javase/specs/jvms/se17/html/jvms-6.html";

/// How the bytes after an opcode are laid out.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum OperandShape {
    None,
    /// One byte: a signed immediate, a constant pool index or an array type code.
    Byte,
    /// A local variable index, one byte or two after `wide`.
    Local,
    /// Two bytes: a signed immediate or a constant pool index.
    Short,
    /// A signed two byte branch offset.
    Branch,
    /// A signed four byte branch offset.
    WideBranch,
    /// Local variable index and signed constant, one byte each or two after `wide`.
    Increment,
    /// Constant pool index, argument count and a zero byte.
    InvokeInterface,
    /// Constant pool index and two zero bytes.
    InvokeDynamic,
    /// Constant pool index and dimension count.
    MultiANewArray,
    TableSwitch,
    LookupSwitch,
    /// The `wide` prefix itself.
    Wide,
}

macro_rules! opcodes {
    ($($name:ident = $byte:literal, $mnemonic:literal, $shape:ident, $anchor:literal, $verbose:literal;)*) => {
        #[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
        #[repr(u8)]
        pub enum Opcode {
            $(
                #[doc = $verbose]
                $name = $byte,
            )*
        }

        impl Opcode {
            /// Looks up an opcode by its byte value, `None` if the byte is unassigned.
            pub const fn from_u8(byte: u8) -> Option<Opcode> {
                match byte {
                    $($byte => Some(Opcode::$name),)*
                    _ => None,
                }
            }

            pub const fn mnemonic(self) -> &'static str {
                match self {
                    $(Opcode::$name => $mnemonic,)*
                }
            }

            pub const fn shape(self) -> OperandShape {
                match self {
                    $(Opcode::$name => OperandShape::$shape,)*
                }
            }

            /// Anchor of the instruction's entry in chapter 6 of the JVM specification, see [`JVMS_CHAPTER_6`].
            pub const fn doc_anchor(self) -> &'static str {
                match self {
                    $(Opcode::$name => $anchor,)*
                }
            }

            /// A short human-readable description of what the instruction does.
            pub const fn verbose_name(self) -> &'static str {
                match self {
                    $(Opcode::$name => $verbose,)*
                }
            }
        }
    };
}

opcodes! {
    Nop             = 0x00, "nop",             None,            "jvms-6.5.nop",              "Do nothing";
    AConstNull      = 0x01, "aconst_null",     None,            "jvms-6.5.aconst_null",      "Push null";
    IConstM1        = 0x02, "iconst_m1",       None,            "jvms-6.5.iconst_i",         "Push int constant -1";
    IConst0         = 0x03, "iconst_0",        None,            "jvms-6.5.iconst_i",         "Push int constant 0";
    IConst1         = 0x04, "iconst_1",        None,            "jvms-6.5.iconst_i",         "Push int constant 1";
    IConst2         = 0x05, "iconst_2",        None,            "jvms-6.5.iconst_i",         "Push int constant 2";
    IConst3         = 0x06, "iconst_3",        None,            "jvms-6.5.iconst_i",         "Push int constant 3";
    IConst4         = 0x07, "iconst_4",        None,            "jvms-6.5.iconst_i",         "Push int constant 4";
    IConst5         = 0x08, "iconst_5",        None,            "jvms-6.5.iconst_i",         "Push int constant 5";
    LConst0         = 0x09, "lconst_0",        None,            "jvms-6.5.lconst_l",         "Push long constant 0";
    LConst1         = 0x0A, "lconst_1",        None,            "jvms-6.5.lconst_l",         "Push long constant 1";
    FConst0         = 0x0B, "fconst_0",        None,            "jvms-6.5.fconst_f",         "Push float constant 0.0";
    FConst1         = 0x0C, "fconst_1",        None,            "jvms-6.5.fconst_f",         "Push float constant 1.0";
    FConst2         = 0x0D, "fconst_2",        None,            "jvms-6.5.fconst_f",         "Push float constant 2.0";
    DConst0         = 0x0E, "dconst_0",        None,            "jvms-6.5.dconst_d",         "Push double constant 0.0";
    DConst1         = 0x0F, "dconst_1",        None,            "jvms-6.5.dconst_d",         "Push double constant 1.0";
    BiPush          = 0x10, "bipush",          Byte,            "jvms-6.5.bipush",           "Push byte";
    SiPush          = 0x11, "sipush",          Short,           "jvms-6.5.sipush",           "Push short";
    Ldc             = 0x12, "ldc",             Byte,            "jvms-6.5.ldc",              "Push item from run-time constant pool";
    LdcW            = 0x13, "ldc_w",           Short,           "jvms-6.5.ldc_w",            "Push item from run-time constant pool (wide index)";
    Ldc2W           = 0x14, "ldc2_w",          Short,           "jvms-6.5.ldc2_w",           "Push long or double from run-time constant pool (wide index)";
    ILoad           = 0x15, "iload",           Local,           "jvms-6.5.iload",            "Load int from local variable";
    LLoad           = 0x16, "lload",           Local,           "jvms-6.5.lload",            "Load long from local variable";
    FLoad           = 0x17, "fload",           Local,           "jvms-6.5.fload",            "Load float from local variable";
    DLoad           = 0x18, "dload",           Local,           "jvms-6.5.dload",            "Load double from local variable";
    ALoad           = 0x19, "aload",           Local,           "jvms-6.5.aload",            "Load reference from local variable";
    ILoad0          = 0x1A, "iload_0",         None,            "jvms-6.5.iload_n",          "Load int from local variable 0";
    ILoad1          = 0x1B, "iload_1",         None,            "jvms-6.5.iload_n",          "Load int from local variable 1";
    ILoad2          = 0x1C, "iload_2",         None,            "jvms-6.5.iload_n",          "Load int from local variable 2";
    ILoad3          = 0x1D, "iload_3",         None,            "jvms-6.5.iload_n",          "Load int from local variable 3";
    LLoad0          = 0x1E, "lload_0",         None,            "jvms-6.5.lload_n",          "Load long from local variable 0";
    LLoad1          = 0x1F, "lload_1",         None,            "jvms-6.5.lload_n",          "Load long from local variable 1";
    LLoad2          = 0x20, "lload_2",         None,            "jvms-6.5.lload_n",          "Load long from local variable 2";
    LLoad3          = 0x21, "lload_3",         None,            "jvms-6.5.lload_n",          "Load long from local variable 3";
    FLoad0          = 0x22, "fload_0",         None,            "jvms-6.5.fload_n",          "Load float from local variable 0";
    FLoad1          = 0x23, "fload_1",         None,            "jvms-6.5.fload_n",          "Load float from local variable 1";
    FLoad2          = 0x24, "fload_2",         None,            "jvms-6.5.fload_n",          "Load float from local variable 2";
    FLoad3          = 0x25, "fload_3",         None,            "jvms-6.5.fload_n",          "Load float from local variable 3";
    DLoad0          = 0x26, "dload_0",         None,            "jvms-6.5.dload_n",          "Load double from local variable 0";
    DLoad1          = 0x27, "dload_1",         None,            "jvms-6.5.dload_n",          "Load double from local variable 1";
    DLoad2          = 0x28, "dload_2",         None,            "jvms-6.5.dload_n",          "Load double from local variable 2";
    DLoad3          = 0x29, "dload_3",         None,            "jvms-6.5.dload_n",          "Load double from local variable 3";
    ALoad0          = 0x2A, "aload_0",         None,            "jvms-6.5.aload_n",          "Load reference from local variable 0";
    ALoad1          = 0x2B, "aload_1",         None,            "jvms-6.5.aload_n",          "Load reference from local variable 1";
    ALoad2          = 0x2C, "aload_2",         None,            "jvms-6.5.aload_n",          "Load reference from local variable 2";
    ALoad3          = 0x2D, "aload_3",         None,            "jvms-6.5.aload_n",          "Load reference from local variable 3";
    IALoad          = 0x2E, "iaload",          None,            "jvms-6.5.iaload",           "Load int from array";
    LALoad          = 0x2F, "laload",          None,            "jvms-6.5.laload",           "Load long from array";
    FALoad          = 0x30, "faload",          None,            "jvms-6.5.faload",           "Load float from array";
    DALoad          = 0x31, "daload",          None,            "jvms-6.5.daload",           "Load double from array";
    AALoad          = 0x32, "aaload",          None,            "jvms-6.5.aaload",           "Load reference from array";
    BALoad          = 0x33, "baload",          None,            "jvms-6.5.baload",           "Load byte or boolean from array";
    CALoad          = 0x34, "caload",          None,            "jvms-6.5.caload",           "Load char from array";
    SALoad          = 0x35, "saload",          None,            "jvms-6.5.saload",           "Load short from array";
    IStore          = 0x36, "istore",          Local,           "jvms-6.5.istore",           "Store int into local variable";
    LStore          = 0x37, "lstore",          Local,           "jvms-6.5.lstore",           "Store long into local variable";
    FStore          = 0x38, "fstore",          Local,           "jvms-6.5.fstore",           "Store float into local variable";
    DStore          = 0x39, "dstore",          Local,           "jvms-6.5.dstore",           "Store double into local variable";
    AStore          = 0x3A, "astore",          Local,           "jvms-6.5.astore",           "Store reference into local variable";
    IStore0         = 0x3B, "istore_0",        None,            "jvms-6.5.istore_n",         "Store int into local variable 0";
    IStore1         = 0x3C, "istore_1",        None,            "jvms-6.5.istore_n",         "Store int into local variable 1";
    IStore2         = 0x3D, "istore_2",        None,            "jvms-6.5.istore_n",         "Store int into local variable 2";
    IStore3         = 0x3E, "istore_3",        None,            "jvms-6.5.istore_n",         "Store int into local variable 3";
    LStore0         = 0x3F, "lstore_0",        None,            "jvms-6.5.lstore_n",         "Store long into local variable 0";
    LStore1         = 0x40, "lstore_1",        None,            "jvms-6.5.lstore_n",         "Store long into local variable 1";
    LStore2         = 0x41, "lstore_2",        None,            "jvms-6.5.lstore_n",         "Store long into local variable 2";
    LStore3         = 0x42, "lstore_3",        None,            "jvms-6.5.lstore_n",         "Store long into local variable 3";
    FStore0         = 0x43, "fstore_0",        None,            "jvms-6.5.fstore_n",         "Store float into local variable 0";
    FStore1         = 0x44, "fstore_1",        None,            "jvms-6.5.fstore_n",         "Store float into local variable 1";
    FStore2         = 0x45, "fstore_2",        None,            "jvms-6.5.fstore_n",         "Store float into local variable 2";
    FStore3         = 0x46, "fstore_3",        None,            "jvms-6.5.fstore_n",         "Store float into local variable 3";
    DStore0         = 0x47, "dstore_0",        None,            "jvms-6.5.dstore_n",         "Store double into local variable 0";
    DStore1         = 0x48, "dstore_1",        None,            "jvms-6.5.dstore_n",         "Store double into local variable 1";
    DStore2         = 0x49, "dstore_2",        None,            "jvms-6.5.dstore_n",         "Store double into local variable 2";
    DStore3         = 0x4A, "dstore_3",        None,            "jvms-6.5.dstore_n",         "Store double into local variable 3";
    AStore0         = 0x4B, "astore_0",        None,            "jvms-6.5.astore_n",         "Store reference into local variable 0";
    AStore1         = 0x4C, "astore_1",        None,            "jvms-6.5.astore_n",         "Store reference into local variable 1";
    AStore2         = 0x4D, "astore_2",        None,            "jvms-6.5.astore_n",         "Store reference into local variable 2";
    AStore3         = 0x4E, "astore_3",        None,            "jvms-6.5.astore_n",         "Store reference into local variable 3";
    IAStore         = 0x4F, "iastore",         None,            "jvms-6.5.iastore",          "Store into int array";
    LAStore         = 0x50, "lastore",         None,            "jvms-6.5.lastore",          "Store into long array";
    FAStore         = 0x51, "fastore",         None,            "jvms-6.5.fastore",          "Store into float array";
    DAStore         = 0x52, "dastore",         None,            "jvms-6.5.dastore",          "Store into double array";
    AAStore         = 0x53, "aastore",         None,            "jvms-6.5.aastore",          "Store into reference array";
    BAStore         = 0x54, "bastore",         None,            "jvms-6.5.bastore",          "Store into byte or boolean array";
    CAStore         = 0x55, "castore",         None,            "jvms-6.5.castore",          "Store into char array";
    SAStore         = 0x56, "sastore",         None,            "jvms-6.5.sastore",          "Store into short array";
    Pop             = 0x57, "pop",             None,            "jvms-6.5.pop",              "Pop the top operand stack value";
    Pop2            = 0x58, "pop2",            None,            "jvms-6.5.pop2",             "Pop the top one or two operand stack values";
    Dup             = 0x59, "dup",             None,            "jvms-6.5.dup",              "Duplicate the top operand stack value";
    DupX1           = 0x5A, "dup_x1",          None,            "jvms-6.5.dup_x1",           "Duplicate the top operand stack value and insert two values down";
    DupX2           = 0x5B, "dup_x2",          None,            "jvms-6.5.dup_x2",           "Duplicate the top operand stack value and insert two or three values down";
    Dup2            = 0x5C, "dup2",            None,            "jvms-6.5.dup2",             "Duplicate the top one or two operand stack values";
    Dup2X1          = 0x5D, "dup2_x1",         None,            "jvms-6.5.dup2_x1",          "Duplicate the top one or two operand stack values and insert two or three values down";
    Dup2X2          = 0x5E, "dup2_x2",         None,            "jvms-6.5.dup2_x2",          "Duplicate the top one or two operand stack values and insert two, three, or four values down";
    Swap            = 0x5F, "swap",            None,            "jvms-6.5.swap",             "Swap the top two operand stack values";
    IAdd            = 0x60, "iadd",            None,            "jvms-6.5.iadd",             "Add int";
    LAdd            = 0x61, "ladd",            None,            "jvms-6.5.ladd",             "Add long";
    FAdd            = 0x62, "fadd",            None,            "jvms-6.5.fadd",             "Add float";
    DAdd            = 0x63, "dadd",            None,            "jvms-6.5.dadd",             "Add double";
    ISub            = 0x64, "isub",            None,            "jvms-6.5.isub",             "Subtract int";
    LSub            = 0x65, "lsub",            None,            "jvms-6.5.lsub",             "Subtract long";
    FSub            = 0x66, "fsub",            None,            "jvms-6.5.fsub",             "Subtract float";
    DSub            = 0x67, "dsub",            None,            "jvms-6.5.dsub",             "Subtract double";
    IMul            = 0x68, "imul",            None,            "jvms-6.5.imul",             "Multiply int";
    LMul            = 0x69, "lmul",            None,            "jvms-6.5.lmul",             "Multiply long";
    FMul            = 0x6A, "fmul",            None,            "jvms-6.5.fmul",             "Multiply float";
    DMul            = 0x6B, "dmul",            None,            "jvms-6.5.dmul",             "Multiply double";
    IDiv            = 0x6C, "idiv",            None,            "jvms-6.5.idiv",             "Divide int";
    LDiv            = 0x6D, "ldiv",            None,            "jvms-6.5.ldiv",             "Divide long";
    FDiv            = 0x6E, "fdiv",            None,            "jvms-6.5.fdiv",             "Divide float";
    DDiv            = 0x6F, "ddiv",            None,            "jvms-6.5.ddiv",             "Divide double";
    IRem            = 0x70, "irem",            None,            "jvms-6.5.irem",             "Remainder int";
    LRem            = 0x71, "lrem",            None,            "jvms-6.5.lrem",             "Remainder long";
    FRem            = 0x72, "frem",            None,            "jvms-6.5.frem",             "Remainder float";
    DRem            = 0x73, "drem",            None,            "jvms-6.5.drem",             "Remainder double";
    INeg            = 0x74, "ineg",            None,            "jvms-6.5.ineg",             "Negate int";
    LNeg            = 0x75, "lneg",            None,            "jvms-6.5.lneg",             "Negate long";
    FNeg            = 0x76, "fneg",            None,            "jvms-6.5.fneg",             "Negate float";
    DNeg            = 0x77, "dneg",            None,            "jvms-6.5.dneg",             "Negate double";
    IShl            = 0x78, "ishl",            None,            "jvms-6.5.ishl",             "Shift left int";
    LShl            = 0x79, "lshl",            None,            "jvms-6.5.lshl",             "Shift left long";
    IShr            = 0x7A, "ishr",            None,            "jvms-6.5.ishr",             "Arithmetic shift right int";
    LShr            = 0x7B, "lshr",            None,            "jvms-6.5.lshr",             "Arithmetic shift right long";
    IUShr           = 0x7C, "iushr",           None,            "jvms-6.5.iushr",            "Logical shift right int";
    LUShr           = 0x7D, "lushr",           None,            "jvms-6.5.lushr",            "Logical shift right long";
    IAnd            = 0x7E, "iand",            None,            "jvms-6.5.iand",             "Boolean AND int";
    LAnd            = 0x7F, "land",            None,            "jvms-6.5.land",             "Boolean AND long";
    IOr             = 0x80, "ior",             None,            "jvms-6.5.ior",              "Boolean OR int";
    LOr             = 0x81, "lor",             None,            "jvms-6.5.lor",              "Boolean OR long";
    IXor            = 0x82, "ixor",            None,            "jvms-6.5.ixor",             "Boolean XOR int";
    LXor            = 0x83, "lxor",            None,            "jvms-6.5.lxor",             "Boolean XOR long";
    IInc            = 0x84, "iinc",            Increment,       "jvms-6.5.iinc",             "Increment local variable by constant";
    I2L             = 0x85, "i2l",             None,            "jvms-6.5.i2l",              "Convert int to long";
    I2F             = 0x86, "i2f",             None,            "jvms-6.5.i2f",              "Convert int to float";
    I2D             = 0x87, "i2d",             None,            "jvms-6.5.i2d",              "Convert int to double";
    L2I             = 0x88, "l2i",             None,            "jvms-6.5.l2i",              "Convert long to int";
    L2F             = 0x89, "l2f",             None,            "jvms-6.5.l2f",              "Convert long to float";
    L2D             = 0x8A, "l2d",             None,            "jvms-6.5.l2d",              "Convert long to double";
    F2I             = 0x8B, "f2i",             None,            "jvms-6.5.f2i",              "Convert float to int";
    F2L             = 0x8C, "f2l",             None,            "jvms-6.5.f2l",              "Convert float to long";
    F2D             = 0x8D, "f2d",             None,            "jvms-6.5.f2d",              "Convert float to double";
    D2I             = 0x8E, "d2i",             None,            "jvms-6.5.d2i",              "Convert double to int";
    D2L             = 0x8F, "d2l",             None,            "jvms-6.5.d2l",              "Convert double to long";
    D2F             = 0x90, "d2f",             None,            "jvms-6.5.d2f",              "Convert double to float";
    I2B             = 0x91, "i2b",             None,            "jvms-6.5.i2b",              "Convert int to byte";
    I2C             = 0x92, "i2c",             None,            "jvms-6.5.i2c",              "Convert int to char";
    I2S             = 0x93, "i2s",             None,            "jvms-6.5.i2s",              "Convert int to short";
    LCmp            = 0x94, "lcmp",            None,            "jvms-6.5.lcmp",             "Compare long";
    FCmpL           = 0x95, "fcmpl",           None,            "jvms-6.5.fcmp_op",          "Compare float, -1 on NaN";
    FCmpG           = 0x96, "fcmpg",           None,            "jvms-6.5.fcmp_op",          "Compare float, 1 on NaN";
    DCmpL           = 0x97, "dcmpl",           None,            "jvms-6.5.dcmp_op",          "Compare double, -1 on NaN";
    DCmpG           = 0x98, "dcmpg",           None,            "jvms-6.5.dcmp_op",          "Compare double, 1 on NaN";
    IfEq            = 0x99, "ifeq",            Branch,          "jvms-6.5.if_cond",          "Branch if int comparison with zero succeeds (== 0)";
    IfNe            = 0x9A, "ifne",            Branch,          "jvms-6.5.if_cond",          "Branch if int comparison with zero succeeds (!= 0)";
    IfLt            = 0x9B, "iflt",            Branch,          "jvms-6.5.if_cond",          "Branch if int comparison with zero succeeds (< 0)";
    IfGe            = 0x9C, "ifge",            Branch,          "jvms-6.5.if_cond",          "Branch if int comparison with zero succeeds (>= 0)";
    IfGt            = 0x9D, "ifgt",            Branch,          "jvms-6.5.if_cond",          "Branch if int comparison with zero succeeds (> 0)";
    IfLe            = 0x9E, "ifle",            Branch,          "jvms-6.5.if_cond",          "Branch if int comparison with zero succeeds (<= 0)";
    IfICmpEq        = 0x9F, "if_icmpeq",       Branch,          "jvms-6.5.if_icmp_cond",     "Branch if int comparison succeeds (==)";
    IfICmpNe        = 0xA0, "if_icmpne",       Branch,          "jvms-6.5.if_icmp_cond",     "Branch if int comparison succeeds (!=)";
    IfICmpLt        = 0xA1, "if_icmplt",       Branch,          "jvms-6.5.if_icmp_cond",     "Branch if int comparison succeeds (<)";
    IfICmpGe        = 0xA2, "if_icmpge",       Branch,          "jvms-6.5.if_icmp_cond",     "Branch if int comparison succeeds (>=)";
    IfICmpGt        = 0xA3, "if_icmpgt",       Branch,          "jvms-6.5.if_icmp_cond",     "Branch if int comparison succeeds (>)";
    IfICmpLe        = 0xA4, "if_icmple",       Branch,          "jvms-6.5.if_icmp_cond",     "Branch if int comparison succeeds (<=)";
    IfACmpEq        = 0xA5, "if_acmpeq",       Branch,          "jvms-6.5.if_acmp_cond",     "Branch if reference comparison succeeds (==)";
    IfACmpNe        = 0xA6, "if_acmpne",       Branch,          "jvms-6.5.if_acmp_cond",     "Branch if reference comparison succeeds (!=)";
    Goto            = 0xA7, "goto",            Branch,          "jvms-6.5.goto",             "Branch always";
    Jsr             = 0xA8, "jsr",             Branch,          "jvms-6.5.jsr",              "Jump subroutine";
    Ret             = 0xA9, "ret",             Local,           "jvms-6.5.ret",              "Return from subroutine";
    TableSwitch     = 0xAA, "tableswitch",     TableSwitch,     "jvms-6.5.tableswitch",      "Access jump table by index and jump";
    LookupSwitch    = 0xAB, "lookupswitch",    LookupSwitch,    "jvms-6.5.lookupswitch",     "Access jump table by key match and jump";
    IReturn         = 0xAC, "ireturn",         None,            "jvms-6.5.ireturn",          "Return int from method";
    LReturn         = 0xAD, "lreturn",         None,            "jvms-6.5.lreturn",          "Return long from method";
    FReturn         = 0xAE, "freturn",         None,            "jvms-6.5.freturn",          "Return float from method";
    DReturn         = 0xAF, "dreturn",         None,            "jvms-6.5.dreturn",          "Return double from method";
    AReturn         = 0xB0, "areturn",         None,            "jvms-6.5.areturn",          "Return reference from method";
    Return          = 0xB1, "return",          None,            "jvms-6.5.return",           "Return void from method";
    GetStatic       = 0xB2, "getstatic",       Short,           "jvms-6.5.getstatic",        "Get static field from class";
    PutStatic       = 0xB3, "putstatic",       Short,           "jvms-6.5.putstatic",        "Set static field in class";
    GetField        = 0xB4, "getfield",        Short,           "jvms-6.5.getfield",         "Fetch field from object";
    PutField        = 0xB5, "putfield",        Short,           "jvms-6.5.putfield",         "Set field in object";
    InvokeVirtual   = 0xB6, "invokevirtual",   Short,           "jvms-6.5.invokevirtual",    "Invoke instance method; dispatch based on class";
    InvokeSpecial   = 0xB7, "invokespecial",   Short,           "jvms-6.5.invokespecial",    "Invoke instance method; direct invocation of instance initialization methods and methods of the current class and its supertypes";
    InvokeStatic    = 0xB8, "invokestatic",    Short,           "jvms-6.5.invokestatic",     "Invoke a class (static) method";
    InvokeInterface = 0xB9, "invokeinterface", InvokeInterface, "jvms-6.5.invokeinterface",  "Invoke interface method";
    InvokeDynamic   = 0xBA, "invokedynamic",   InvokeDynamic,   "jvms-6.5.invokedynamic",    "Invoke a dynamically-computed call site";
    New             = 0xBB, "new",             Short,           "jvms-6.5.new",              "Create new object";
    NewArray        = 0xBC, "newarray",        Byte,            "jvms-6.5.newarray",         "Create new array";
    ANewArray       = 0xBD, "anewarray",       Short,           "jvms-6.5.anewarray",        "Create new array of reference";
    ArrayLength     = 0xBE, "arraylength",     None,            "jvms-6.5.arraylength",      "Get length of array";
    AThrow          = 0xBF, "athrow",          None,            "jvms-6.5.athrow",           "Throw exception or error";
    CheckCast       = 0xC0, "checkcast",       Short,           "jvms-6.5.checkcast",        "Check whether object is of given type";
    InstanceOf      = 0xC1, "instanceof",      Short,           "jvms-6.5.instanceof",       "Determine if object is of given type";
    MonitorEnter    = 0xC2, "monitorenter",    None,            "jvms-6.5.monitorenter",     "Enter monitor for object";
    MonitorExit     = 0xC3, "monitorexit",     None,            "jvms-6.5.monitorexit",      "Exit monitor for object";
    Wide            = 0xC4, "wide",            Wide,            "jvms-6.5.wide",             "Extend local variable index by additional bytes";
    MultiANewArray  = 0xC5, "multianewarray",  MultiANewArray,  "jvms-6.5.multianewarray",   "Create new multidimensional array";
    IfNull          = 0xC6, "ifnull",          Branch,          "jvms-6.5.ifnull",           "Branch if reference is null";
    IfNonNull       = 0xC7, "ifnonnull",       Branch,          "jvms-6.5.ifnonnull",        "Branch if reference not null";
    GotoW           = 0xC8, "goto_w",          WideBranch,      "jvms-6.5.goto_w",           "Branch always (wide index)";
    JsrW            = 0xC9, "jsr_w",           WideBranch,      "jvms-6.5.jsr_w",            "Jump subroutine (wide index)";
    Breakpoint      = 0xCA, "breakpoint",      None,            "jvms-6.2",                  "Reserved for debuggers";
    ImpDep1         = 0xFE, "impdep1",         None,            "jvms-6.2",                  "Reserved for implementation-dependent operations";
    ImpDep2         = 0xFF, "impdep2",         None,            "jvms-6.2",                  "Reserved for implementation-dependent operations";
}

impl Opcode {
    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn doc_url(self) -> String {
        format!("{}#{}", JVMS_CHAPTER_6, self.doc_anchor())
    }

    /// Whether the operand holds a branch offset relative to the instruction.
    pub fn is_branch(self) -> bool {
        matches!(
            self.shape(),
            OperandShape::Branch
                | OperandShape::WideBranch
                | OperandShape::TableSwitch
                | OperandShape::LookupSwitch
        )
    }

    /// Opcodes that may follow a `wide` prefix.
    pub fn is_widenable(self) -> bool {
        matches!(self.shape(), OperandShape::Local | OperandShape::Increment)
    }

    /// Opcodes that only debuggers and the JVM itself use; they never appear in a valid class file.
    pub fn is_reserved(self) -> bool {
        matches!(self, Opcode::Breakpoint | Opcode::ImpDep1 | Opcode::ImpDep2)
    }
}

impl From<Opcode> for u8 {
    fn from(op: Opcode) -> u8 {
        op as u8
    }
}

impl TryFrom<u8> for Opcode {
    type Error = Error;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        Opcode::from_u8(byte).ok_or_else(|| Error::Invalid("opcode", format!("{:#04x}", byte)))
    }
}

impl Display for Opcode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mnemonic())
    }
}
