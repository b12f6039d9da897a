// Copyright 2019 Zhizhesihai (Beijing) Technology Limited.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// See the License for the specific language governing permissions and
// limitations under the License.

mod multi_value_mode;

pub use self::multi_value_mode::*;

pub mod geo_distance;

mod missing;

pub use self::missing::*;

mod values_source;

pub use self::values_source::*;

mod sort_config;

pub use self::sort_config::*;
