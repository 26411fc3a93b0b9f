// Code Generation Tests for the VM translator

#[cfg(test)]
mod tests {
    use crate::emulator::{assemble, HackMachine};
    use crate::vm_translator::codegen::CodeWriter;
    use crate::vm_translator::command::{ArithmeticOp, Command, Segment};
    use crate::vm_translator::error::TranslatorError;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use test_log::test;

    const STACK_BASE: u16 = 256;
    const MAX_STEPS: usize = 10_000;

    fn translate(commands: &[Command]) -> String {
        let mut writer = CodeWriter::new(Vec::new());
        writer.set_unit_name("Test");
        for command in commands {
            writer.write_command(command).unwrap();
        }
        String::from_utf8(writer.into_inner()).unwrap()
    }

    /// Translate, assemble and run with SP at the stack base and `stack` pushed
    fn execute(commands: &[Command], stack: &[i16]) -> HackMachine {
        let mut machine = HackMachine::new(assemble(&translate(commands)).unwrap());
        for (offset, value) in stack.iter().enumerate() {
            machine.set_ram(STACK_BASE + offset as u16, *value);
        }
        machine.set_ram(0, (STACK_BASE + stack.len() as u16) as i16);
        machine.run(MAX_STEPS).unwrap();
        machine
    }

    fn compare(op: ArithmeticOp, x: i16, y: i16) -> i16 {
        let machine = execute(&[Command::Arithmetic(op)], &[x, y]);
        let stack = machine.stack(STACK_BASE);
        assert_eq!(stack.len(), 1, "{} {} {} left {:?}", op, x, y, stack);
        stack[0]
    }

    fn expected(op: ArithmeticOp, x: i16, y: i16) -> i16 {
        let result = match op {
            ArithmeticOp::Eq => x == y,
            ArithmeticOp::Gt => x > y,
            ArithmeticOp::Lt => x < y,
            _ => unreachable!("not a comparison"),
        };
        if result {
            -1
        } else {
            0
        }
    }

    #[test]
    fn test_push_constant_text() {
        let asm = translate(&[Command::Push(Segment::Constant, 7)]);
        assert_eq!(asm, "@7\nD=A\n@SP\nA=M\nM=D\n@SP\nM=M+1\n");
    }

    #[test]
    fn test_every_line_is_newline_terminated() {
        let asm = translate(&[
            Command::Push(Segment::Local, 1),
            Command::Arithmetic(ArithmeticOp::Eq),
            Command::Call("Foo.bar".to_string(), 1),
            Command::Return,
        ]);
        assert!(asm.ends_with('\n'));
        assert!(!asm.contains("\n\n"));
    }

    #[test]
    fn test_static_symbols_scoped_by_unit() {
        let mut writer = CodeWriter::new(Vec::new());
        writer.set_unit_name("Foo");
        writer.write_push(Segment::Static, 3).unwrap();
        writer.set_unit_name("Bar");
        writer.write_push(Segment::Static, 3).unwrap();
        let asm = String::from_utf8(writer.into_inner()).unwrap();

        assert!(asm.contains("@Foo.3\n"));
        assert!(asm.contains("@Bar.3\n"));
        let program = assemble(&asm).unwrap();
        assert_ne!(program.symbol("Foo.3"), program.symbol("Bar.3"));
    }

    #[test]
    fn test_pop_constant_is_invalid_segment() {
        let mut writer = CodeWriter::new(Vec::new());
        let err = writer.write_pop(Segment::Constant, 0).unwrap_err();
        assert!(matches!(err, TranslatorError::InvalidSegment(_)));
    }

    #[test]
    fn test_repeated_comparisons_get_unique_labels() {
        let asm = translate(&[
            Command::Arithmetic(ArithmeticOp::Eq),
            Command::Arithmetic(ArithmeticOp::Eq),
            Command::Arithmetic(ArithmeticOp::Lt),
        ]);
        assert!(asm.contains("(CMP$TRUE$1)"));
        assert!(asm.contains("(CMP$TRUE$2)"));
        assert!(asm.contains("(CMP$TRUE$3)"));
        // The assembler rejects any redefined label
        assert!(assemble(&asm).is_ok());
    }

    #[test]
    fn test_repeated_calls_get_unique_return_labels() {
        let asm = translate(&[
            Command::Call("Foo".to_string(), 2),
            Command::Call("Foo".to_string(), 2),
        ]);
        assert!(asm.contains("(Foo$ret$1)"));
        assert!(asm.contains("(Foo$ret$2)"));
        assert!(assemble(&asm).is_ok());
    }

    #[test]
    fn test_counters_advance_only_for_their_kind() {
        let mut writer = CodeWriter::new(Vec::new());
        writer.write_arithmetic(ArithmeticOp::Add).unwrap();
        writer.write_arithmetic(ArithmeticOp::Gt).unwrap();
        writer.write_call("Foo", 0).unwrap();
        writer.write_return().unwrap();
        assert_eq!(writer.context().comparison_count(), 1);
        assert_eq!(writer.context().call_count(), 1);
    }

    #[test]
    fn test_annotations() {
        let mut writer = CodeWriter::new(Vec::new()).with_annotations(true);
        writer.set_unit_name("Test");
        writer
            .write_command(&Command::Push(Segment::Argument, 1))
            .unwrap();
        let asm = String::from_utf8(writer.into_inner()).unwrap();
        assert!(asm.starts_with("// push argument 1\n@ARG\n"));
    }

    #[test]
    fn test_binary_ops() {
        let cases = [
            (ArithmeticOp::Add, 17, 25, 42),
            (ArithmeticOp::Sub, 7, 2, 5),
            (ArithmeticOp::Sub, 2, 7, -5),
            (ArithmeticOp::And, 0b1100, 0b1010, 0b1000),
            (ArithmeticOp::Or, 0b1100, 0b1010, 0b1110),
            (ArithmeticOp::Add, i16::MAX, 1, i16::MIN),
        ];
        for (op, x, y, result) in cases {
            let machine = execute(&[Command::Arithmetic(op)], &[99, x, y]);
            assert_eq!(machine.stack(STACK_BASE), vec![99, result], "{}", op);
        }
    }

    #[test]
    fn test_unary_ops() {
        let cases = [
            (ArithmeticOp::Neg, 5, -5),
            (ArithmeticOp::Neg, i16::MIN, i16::MIN),
            (ArithmeticOp::Not, 0, -1),
            (ArithmeticOp::Not, 0x00FF, !0x00FF),
            (ArithmeticOp::ShiftLeft, 3, 6),
            (ArithmeticOp::ShiftRight, 6, 3),
            (ArithmeticOp::ShiftRight, -6, -3),
        ];
        for (op, x, result) in cases {
            let machine = execute(&[Command::Arithmetic(op)], &[99, x]);
            assert_eq!(machine.stack(STACK_BASE), vec![99, result], "{}", op);
        }
    }

    #[test]
    fn test_comparison_boundaries() {
        let interesting = [i16::MIN, i16::MIN + 1, -2, -1, 0, 1, 2, i16::MAX - 1, i16::MAX];
        for op in [ArithmeticOp::Eq, ArithmeticOp::Gt, ArithmeticOp::Lt] {
            for &x in &interesting {
                for &y in &interesting {
                    assert_eq!(compare(op, x, y), expected(op, x, y), "{} {} {}", x, op, y);
                }
            }
        }
    }

    #[test]
    fn test_comparison_overflowing_pair() {
        assert_eq!(compare(ArithmeticOp::Gt, -32768, 32767), 0);
        assert_eq!(compare(ArithmeticOp::Lt, -32768, 32767), -1);
        assert_eq!(compare(ArithmeticOp::Gt, 32767, -32768), -1);
        assert_eq!(compare(ArithmeticOp::Gt, 0, -32768), -1);
        assert_eq!(compare(ArithmeticOp::Eq, 0, -32768), 0);
    }

    #[test]
    fn test_comparison_sampled_pairs() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for _ in 0..200 {
            let x: i16 = rng.gen();
            let y: i16 = rng.gen();
            for op in [ArithmeticOp::Eq, ArithmeticOp::Gt, ArithmeticOp::Lt] {
                assert_eq!(compare(op, x, y), expected(op, x, y), "{} {} {}", x, op, y);
            }
        }
    }

    #[test]
    fn test_stack_depth_per_opcode() {
        for op in ArithmeticOp::ALL {
            let machine = execute(&[Command::Arithmetic(op)], &[1, 2, 3]);
            let depth = machine.stack(STACK_BASE).len() as i32;
            assert_eq!(depth, 3 + op.stack_effect(), "{}", op);
        }
    }

    #[test]
    fn test_push_and_pop_through_base_registers() {
        let commands = [
            Command::Push(Segment::Local, 2),
            Command::Push(Segment::Argument, 1),
            Command::Arithmetic(ArithmeticOp::Add),
            Command::Pop(Segment::That, 5),
        ];
        let mut machine = HackMachine::new(assemble(&translate(&commands)).unwrap());
        machine.set_ram(0, STACK_BASE as i16);
        machine.set_ram(1, 300); // LCL
        machine.set_ram(2, 400); // ARG
        machine.set_ram(4, 3000); // THAT
        machine.set_ram(302, 10);
        machine.set_ram(401, 32);
        machine.run(MAX_STEPS).unwrap();

        assert_eq!(machine.ram(3005), 42);
        assert_eq!(machine.sp(), STACK_BASE);
    }

    #[test]
    fn test_pointer_and_temp_are_fixed_addresses() {
        let commands = [
            Command::Push(Segment::Constant, 3030),
            Command::Pop(Segment::Pointer, 0),
            Command::Push(Segment::Constant, 3040),
            Command::Pop(Segment::Pointer, 1),
            Command::Push(Segment::Constant, 11),
            Command::Pop(Segment::Temp, 6),
            Command::Push(Segment::Temp, 6),
            Command::Pop(Segment::This, 2),
        ];
        let machine = execute(&commands, &[]);
        assert_eq!(machine.ram(3), 3030);
        assert_eq!(machine.ram(4), 3040);
        assert_eq!(machine.ram(11), 11);
        assert_eq!(machine.ram(3032), 11);
    }

    #[test]
    fn test_round_trip_into_local() {
        let commands = [
            Command::Push(Segment::Constant, 7),
            Command::Push(Segment::Constant, 2),
            Command::Arithmetic(ArithmeticOp::Sub),
            Command::Pop(Segment::Local, 0),
        ];
        let mut machine = HackMachine::new(assemble(&translate(&commands)).unwrap());
        machine.set_ram(0, STACK_BASE as i16);
        machine.set_ram(1, 300);
        machine.run(MAX_STEPS).unwrap();

        assert_eq!(machine.ram(300), 5);
        assert_eq!(machine.sp(), STACK_BASE);
    }

    #[test]
    fn test_if_goto_pops_and_branches_on_nonzero() {
        for (condition, taken) in [(-1, true), (0, false), (5, true)] {
            let commands = [
                Command::IfGoto("TAKEN".to_string()),
                Command::Push(Segment::Constant, 1),
                Command::Goto("END".to_string()),
                Command::Label("TAKEN".to_string()),
                Command::Push(Segment::Constant, 2),
                Command::Label("END".to_string()),
            ];
            let machine = execute(&commands, &[condition]);
            let expected = if taken { 2 } else { 1 };
            assert_eq!(machine.stack(STACK_BASE), vec![expected]);
        }
    }

    #[test]
    fn test_function_zeroes_locals() {
        let commands = [Command::Function("Foo.bar".to_string(), 3)];
        let mut machine = HackMachine::new(assemble(&translate(&commands)).unwrap());
        machine.set_ram(0, STACK_BASE as i16);
        for address in STACK_BASE..STACK_BASE + 3 {
            machine.set_ram(address, 77);
        }
        machine.run(MAX_STEPS).unwrap();
        assert_eq!(machine.stack(STACK_BASE), vec![0, 0, 0]);
    }
}
