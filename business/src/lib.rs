pub mod application {
    pub mod orchestrator;
    pub mod account {
        pub mod flush;
        pub mod list;
        pub mod login;
        pub mod orders;
        pub mod remove;
        pub mod verification;
    }
    pub mod receipt {
        pub mod scan;
    }
    pub mod request {
        pub mod correlator;
    }
    pub mod session {
        pub mod initialize;
    }
}

pub mod domain {
    pub mod errors;
    pub mod logger;
    pub mod account {
        pub mod model;
        pub mod services;
        pub mod value_objects;
        pub mod use_cases {
            pub mod flush;
            pub mod list;
            pub mod login;
            pub mod orders;
            pub mod remove;
        }
    }
    pub mod receipt {
        pub mod model;
        pub mod services;
        pub mod use_cases {
            pub mod scan;
        }
    }
    pub mod request {
        pub mod events;
        pub mod model;
    }
    pub mod session {
        pub mod model;
        pub mod use_cases {
            pub mod initialize;
        }
    }
    pub mod shared {
        pub mod value_objects;
    }
}

#[cfg(test)]
mod test_support;
