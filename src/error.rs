extern crate error_chain;
extern crate serde_json;

error_chain! {
    types {
        Error, ErrorKind, ResultExt, Result;
    }
    errors {
        IllegalState(desc: String) {
            description(desc)
            display("Illegal state: {}", desc)
        }

        IllegalArgument(desc: String) {
            description(desc)
            display("Illegal argument: {}", desc)
        }
    }

    foreign_links {
        ParseFloatError(::std::num::ParseFloatError);
        SerdeJsonError(self::serde_json::Error);
    }
}
